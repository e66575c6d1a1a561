//! Re-chunks PTY output so multi-byte UTF-8 sequences split across reads
//! are never sent as separate (and broken) text frames.

/// Carries an incomplete trailing sequence over to the next chunk.
#[derive(Debug, Default)]
pub struct Utf8Chunker {
    carry: Vec<u8>,
}

impl Utf8Chunker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `bytes` and return everything that is now decodable. Invalid
    /// bytes become U+FFFD; an incomplete tail waits for the next call.
    pub fn push(&mut self, bytes: &[u8]) -> String {
        self.carry.extend_from_slice(bytes);
        let mut out = String::with_capacity(self.carry.len());
        loop {
            match std::str::from_utf8(&self.carry) {
                Ok(text) => {
                    out.push_str(text);
                    self.carry.clear();
                    break;
                }
                Err(e) => {
                    let valid = e.valid_up_to();
                    out.push_str(&String::from_utf8_lossy(&self.carry[..valid]));
                    match e.error_len() {
                        Some(bad) => {
                            out.push(char::REPLACEMENT_CHARACTER);
                            self.carry.drain(..valid + bad);
                        }
                        None => {
                            self.carry.drain(..valid);
                            break;
                        }
                    }
                }
            }
        }
        out
    }

    /// Flush whatever is still carried, lossily.
    pub fn finish(&mut self) -> Option<String> {
        if self.carry.is_empty() {
            return None;
        }
        let rest = String::from_utf8_lossy(&self.carry).into_owned();
        self.carry.clear();
        Some(rest)
    }

    pub fn pending(&self) -> usize {
        self.carry.len()
    }
}
