use super::PromptError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placeholder {
    ActiveTask,
    Context,
    OpenTag,
    CloseTag,
}

impl Placeholder {
    fn parse(token: &str) -> Option<Self> {
        match token {
            "active_task" => Some(Self::ActiveTask),
            "context" => Some(Self::Context),
            "open_tag" => Some(Self::OpenTag),
            "close_tag" => Some(Self::CloseTag),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Slot(Placeholder),
}

/// A system prompt template split into literal text and `{{placeholder}}` slots.
///
/// Parsing validates every placeholder up front so rendering cannot fail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptTemplate {
    segments: Vec<Segment>,
}

impl PromptTemplate {
    pub fn parse(template: &str) -> Result<Self, PromptError> {
        let mut segments = Vec::new();
        let mut cursor = template;

        while let Some(start) = cursor.find("{{") {
            if start > 0 {
                segments.push(Segment::Literal(cursor[..start].to_string()));
            }
            let after_open = &cursor[start + 2..];
            let Some(close_offset) = after_open.find("}}") else {
                return Err(PromptError::UnclosedPlaceholder);
            };
            let token = after_open[..close_offset].trim();
            if token.is_empty() {
                return Err(PromptError::EmptyPlaceholder);
            }
            let placeholder = Placeholder::parse(token)
                .ok_or_else(|| PromptError::UnknownPlaceholder(token.to_string()))?;
            segments.push(Segment::Slot(placeholder));
            cursor = &after_open[close_offset + 2..];
        }

        if !cursor.is_empty() {
            segments.push(Segment::Literal(cursor.to_string()));
        }
        Ok(Self { segments })
    }

    pub fn uses(&self, placeholder: Placeholder) -> bool {
        self.segments
            .iter()
            .any(|segment| *segment == Segment::Slot(placeholder))
    }

    pub fn render<F>(&self, mut resolve: F) -> String
    where
        F: FnMut(Placeholder) -> String,
    {
        let mut rendered = String::new();
        for segment in &self.segments {
            match segment {
                Segment::Literal(text) => rendered.push_str(text),
                Segment::Slot(placeholder) => rendered.push_str(&resolve(*placeholder)),
            }
        }
        rendered
    }
}
