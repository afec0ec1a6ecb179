use std::io::BufRead;

pub const DONE_MARKER: &str = "[DONE]";

/// Iterates the `data` payloads of a server-sent event stream.
///
/// Consecutive `data:` lines form one event and are joined with `\n`; a blank
/// line dispatches it. Comments and other fields are skipped.
pub struct SseEvents<R> {
    reader: R,
    finished: bool,
}

impl<R: BufRead> SseEvents<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            finished: false,
        }
    }
}

fn data_field(line: &str) -> Option<&str> {
    let value = line.strip_prefix("data:")?;
    Some(value.strip_prefix(' ').unwrap_or(value))
}

impl<R: BufRead> Iterator for SseEvents<R> {
    type Item = std::io::Result<String>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }

        let mut data: Option<String> = None;
        let mut line = String::new();
        loop {
            line.clear();
            let read = match self.reader.read_line(&mut line) {
                Ok(read) => read,
                Err(err) => {
                    self.finished = true;
                    return Some(Err(err));
                }
            };
            if read == 0 {
                self.finished = true;
                return data.map(Ok);
            }

            let trimmed = line.trim_end_matches(['\r', '\n']);
            if trimmed.is_empty() {
                if data.is_some() {
                    return data.map(Ok);
                }
                continue;
            }
            if trimmed.starts_with(':') {
                continue;
            }
            if let Some(value) = data_field(trimmed) {
                match data.as_mut() {
                    Some(existing) => {
                        existing.push('\n');
                        existing.push_str(value);
                    }
                    None => data = Some(value.to_string()),
                }
            }
        }
    }
}
