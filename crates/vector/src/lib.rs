//! Recap Vector
//!
//! 청크 임베딩 클러스터링: linfa k-means, silhouette 기반 k 선택, 대표 청크 선택

mod selector;
mod similarity;

pub use selector::ClusterSelector;
pub use similarity::{distinct_rows, normalize_rows, squared_distance};
