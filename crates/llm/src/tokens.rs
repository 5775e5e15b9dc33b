use recap_common::{RecapError, Result};
use tiktoken_rs::{get_bpe_from_model, CoreBPE};
use tracing::{debug, info, warn};

/// Counts tokens the way the model API does
pub trait TokenCounter: Send + Sync {
    fn count(&self, text: &str) -> usize;
}

/// tiktoken BPE counter
pub struct TiktokenCounter {
    bpe: CoreBPE,
}

impl TiktokenCounter {
    /// Load the BPE ranks used by `model` (e.g. "gpt-3.5-turbo" -> cl100k_base)
    pub fn for_model(model: &str) -> Result<Self> {
        let bpe = get_bpe_from_model(model)
            .map_err(|e| RecapError::external("tokenizer", format!("{}: {}", model, e)))?;
        info!("Tokenizer loaded for model: {}", model);
        Ok(Self { bpe })
    }
}

impl TokenCounter for TiktokenCounter {
    fn count(&self, text: &str) -> usize {
        self.bpe.encode_ordinary(text).len()
    }
}

/// Accepts documents whose token count lies in a closed interval
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SizeGate {
    pub minimum: usize,
    pub maximum: usize,
}

impl SizeGate {
    pub fn new(minimum: usize, maximum: usize) -> Self {
        Self { minimum, maximum }
    }

    /// Check a token count
    pub fn check(&self, tokens: usize) -> Result<()> {
        if tokens > self.maximum {
            warn!("Document rejected: {} tokens > {}", tokens, self.maximum);
            return Err(RecapError::DocumentTooLarge {
                tokens,
                maximum: self.maximum,
            });
        }

        if tokens < self.minimum {
            warn!("Document rejected: {} tokens < {}", tokens, self.minimum);
            return Err(RecapError::DocumentTooSmall {
                tokens,
                minimum: self.minimum,
            });
        }

        debug!("Document size accepted: {} tokens", tokens);
        Ok(())
    }

    /// Count `text` and check it, returning the count
    pub fn measure(&self, counter: &dyn TokenCounter, text: &str) -> Result<usize> {
        let tokens = counter.count(text);
        self.check(tokens)?;
        Ok(tokens)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct WordCounter;

    impl TokenCounter for WordCounter {
        fn count(&self, text: &str) -> usize {
            text.split_whitespace().count()
        }
    }

    #[test]
    fn test_size_gate_boundaries() {
        let gate = SizeGate::new(2000, 800_000);

        assert!(matches!(
            gate.check(1999),
            Err(RecapError::DocumentTooSmall { tokens: 1999, minimum: 2000 })
        ));
        assert!(gate.check(2000).is_ok());
        assert!(gate.check(800_000).is_ok());
        assert!(matches!(
            gate.check(800_001),
            Err(RecapError::DocumentTooLarge { tokens: 800_001, maximum: 800_000 })
        ));
    }

    #[test]
    fn test_size_gate_messages() {
        let gate = SizeGate::new(2000, 800_000);
        assert_eq!(
            gate.check(0).unwrap_err().user_message(),
            "File or transcript too small!"
        );
        assert_eq!(
            gate.check(1_000_000).unwrap_err().user_message(),
            "File or transcript too big!"
        );
    }

    #[test]
    fn test_measure_uses_counter() {
        let gate = SizeGate::new(3, 5);
        assert_eq!(gate.measure(&WordCounter, "one two three four").unwrap(), 4);
        assert!(gate.measure(&WordCounter, "one two").is_err());
    }

    #[test]
    fn test_tiktoken_counts() {
        let counter = TiktokenCounter::for_model("gpt-3.5-turbo").unwrap();
        assert_eq!(counter.count(""), 0);
        assert!(counter.count("hello world") >= 2);
        // Special token markers are counted as ordinary text
        assert!(counter.count("<|endoftext|>") > 1);
    }
}
