use actix_multipart::Multipart;
use actix_web::http::{header::ContentType, StatusCode};
use actix_web::{get, post, web, HttpResponse};
use recap_common::RecapError;
use recap_loader::Input;
use std::sync::Arc;

use crate::form::read_summarize_form;
use crate::page::PageView;
use crate::state::AppState;
use crate::types::{ErrorResponse, SummaryResponse};

fn status_of(e: &RecapError) -> StatusCode {
    StatusCode::from_u16(e.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
}

fn render_page(
    state: &AppState,
    view: &PageView,
    status: StatusCode,
) -> actix_web::Result<HttpResponse> {
    let html = state
        .pages
        .render(view)
        .map_err(actix_web::error::ErrorInternalServerError)?;

    Ok(HttpResponse::build(status)
        .content_type(ContentType::html())
        .body(html))
}

fn blank_view(state: &AppState) -> PageView {
    PageView {
        advanced_model: state.config.advanced_model.clone(),
        ..Default::default()
    }
}

/// Form page
#[get("/")]
pub async fn index(state: web::Data<Arc<AppState>>) -> actix_web::Result<HttpResponse> {
    render_page(&state, &blank_view(&state), StatusCode::OK)
}

/// Form submission from the browser; answers with the page
#[post("/summarize")]
pub async fn summarize_page(
    payload: Multipart,
    state: web::Data<Arc<AppState>>,
) -> actix_web::Result<HttpResponse> {
    let mut view = blank_view(&state);

    let form = read_summarize_form(
        payload,
        &state.config.upload_dir,
        state.config.max_upload_bytes,
    );
    let result = match form.await {
        Ok(request) => {
            view.use_advanced_model = request.options.use_advanced_model;
            view.find_clusters = request.options.find_clusters;
            if let Some(Input::VideoUrl(url)) = &request.input {
                view.video_url = url.clone();
            }
            state.pipeline.run(request).await
        }
        Err(e) => Err(e),
    };

    match result {
        Ok(outcome) => {
            let response = SummaryResponse::from(outcome);
            view.summary_html = Some(response.summary_html);
            view.model = Some(response.model);
            view.chunks_total = Some(response.chunks_total);
            view.chunks_summarized = Some(response.chunks_summarized);
            view.generated_at = Some(response.generated_at.format("%Y-%m-%d %H:%M UTC").to_string());
            render_page(&state, &view, StatusCode::OK)
        }
        Err(e) => {
            view.warning = Some(e.user_message());
            render_page(&state, &view, status_of(&e))
        }
    }
}

/// Same form, JSON answer
#[post("/api/summarize")]
pub async fn summarize_api(
    payload: Multipart,
    state: web::Data<Arc<AppState>>,
) -> actix_web::Result<HttpResponse> {
    let form = read_summarize_form(
        payload,
        &state.config.upload_dir,
        state.config.max_upload_bytes,
    );
    let result = match form.await {
        Ok(request) => state.pipeline.run(request).await,
        Err(e) => Err(e),
    };

    match result {
        Ok(outcome) => Ok(HttpResponse::Ok().json(SummaryResponse::from(outcome))),
        Err(e) => Ok(HttpResponse::build(status_of(&e)).json(ErrorResponse::from(&e))),
    }
}
