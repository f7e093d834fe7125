use std::{collections::VecDeque, time::Duration};

use crate::constants::MAX_CONSOLE_LINES;

/// colour family of a console line.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Tone {
    Normal,
    Info,
    Success,
    Warning,
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ConsoleLine {
    pub text: String,
    pub tone: Tone,
}

struct Message {
    chars: VecDeque<char>,
    tone: Tone,
    delay: Duration,
}

/// a scrollback that prints queued messages one character at a time.
///
/// messages never interleave: each one is typed to the end, followed by a line
/// break, before the next begins.
pub struct Console {
    lines: VecDeque<ConsoleLine>,
    /// the line currently being typed, if any.
    partial: Option<ConsoleLine>,
    current: Option<Message>,
    pending: VecDeque<Message>,
    /// elapsed time not yet spent on characters.
    budget: Duration,
    delay: Duration,
}

impl Console {
    pub fn new(delay: Duration) -> Self {
        Self {
            lines: VecDeque::new(),
            partial: None,
            current: None,
            pending: VecDeque::new(),
            budget: Duration::ZERO,
            delay,
        }
    }

    pub fn type_text(&mut self, text: impl Into<String>, tone: Tone) {
        let delay = self.delay;
        self.type_text_with_delay(text, tone, delay);
    }

    pub fn type_text_with_delay(&mut self, text: impl Into<String>, tone: Tone, delay: Duration) {
        let text = text.into();
        self.pending.push_back(Message {
            chars: text.chars().collect(),
            tone,
            delay,
        });
    }

    /// reveals whatever `elapsed` pays for.
    pub fn advance(&mut self, elapsed: Duration) {
        self.budget += elapsed;

        loop {
            if self.current.is_none() {
                match self.pending.pop_front() {
                    Some(message) => {
                        self.partial = Some(ConsoleLine {
                            text: String::new(),
                            tone: message.tone,
                        });
                        self.current = Some(message);
                    }
                    None => {
                        // idle time does not bank characters.
                        self.budget = Duration::ZERO;
                        return;
                    }
                }
            }

            let Some(message) = self.current.as_mut() else {
                return;
            };
            if message.delay > self.budget {
                return;
            }
            self.budget -= message.delay;

            match message.chars.pop_front() {
                Some('\n') => {
                    let tone = message.tone;
                    self.break_line(tone);
                }
                Some(ch) => {
                    if let Some(partial) = self.partial.as_mut() {
                        partial.text.push(ch);
                    }
                }
                None => {
                    self.current = None;
                    if let Some(line) = self.partial.take() {
                        self.push_line(line);
                    }
                }
            }
        }
    }

    /// drops every line, including anything still queued.
    pub fn clear(&mut self) {
        self.lines.clear();
        self.partial = None;
        self.current = None;
        self.pending.clear();
        self.budget = Duration::ZERO;
    }

    #[cfg(test)]
    pub fn is_idle(&self) -> bool {
        self.current.is_none() && self.pending.is_empty()
    }

    /// completed lines followed by the one being typed.
    pub fn visible_lines(&self) -> impl Iterator<Item = &ConsoleLine> {
        self.lines.iter().chain(self.partial.iter())
    }

    fn break_line(&mut self, tone: Tone) {
        if let Some(line) = self.partial.replace(ConsoleLine {
            text: String::new(),
            tone,
        }) {
            self.push_line(line);
        }
    }

    fn push_line(&mut self, line: ConsoleLine) {
        self.lines.push_back(line);
        while self.lines.len() > MAX_CONSOLE_LINES {
            self.lines.pop_front();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MS: Duration = Duration::from_millis(1);

    fn texts(console: &Console) -> Vec<String> {
        console.visible_lines().map(|l| l.text.clone()).collect()
    }

    #[test]
    fn types_one_character_per_delay() {
        let mut console = Console::new(10 * MS);
        console.type_text("hello", Tone::Normal);

        console.advance(30 * MS);
        assert_eq!(texts(&console), ["hel"]);

        console.advance(5 * MS);
        assert_eq!(texts(&console), ["hel"]);

        console.advance(15 * MS);
        assert_eq!(texts(&console), ["hello"]);
        assert!(!console.is_idle());

        // the closing line break costs one more step.
        console.advance(10 * MS);
        assert!(console.is_idle());
        assert_eq!(texts(&console), ["hello"]);
    }

    #[test]
    fn messages_are_typed_in_order() {
        let mut console = Console::new(MS);
        console.type_text("first", Tone::Info);
        console.type_text("second", Tone::Warning);
        console.advance(100 * MS);

        let lines: Vec<_> = console.visible_lines().cloned().collect();
        assert_eq!(
            lines,
            [
                ConsoleLine { text: "first".into(), tone: Tone::Info },
                ConsoleLine { text: "second".into(), tone: Tone::Warning },
            ]
        );
    }

    #[test]
    fn embedded_newlines_split_lines() {
        let mut console = Console::new(Duration::ZERO);
        console.type_text("a: 1\nb: 2", Tone::Success);
        console.advance(Duration::ZERO);
        assert_eq!(texts(&console), ["a: 1", "b: 2"]);
    }

    #[test]
    fn idle_time_is_not_banked() {
        let mut console = Console::new(10 * MS);
        console.advance(Duration::from_secs(5));
        console.type_text("abc", Tone::Normal);
        console.advance(10 * MS);
        assert_eq!(texts(&console), ["a"]);
    }

    #[test]
    fn clear_drops_lines_and_queue() {
        let mut console = Console::new(MS);
        console.type_text("done", Tone::Normal);
        console.advance(100 * MS);
        console.type_text("pending", Tone::Normal);
        console.advance(2 * MS);

        console.clear();
        assert!(console.is_idle());
        assert_eq!(console.visible_lines().count(), 0);

        console.advance(100 * MS);
        assert_eq!(console.visible_lines().count(), 0);
    }

    #[test]
    fn scrollback_is_bounded() {
        let mut console = Console::new(Duration::ZERO);
        for i in 0..(MAX_CONSOLE_LINES + 50) {
            console.type_text(format!("line {i}"), Tone::Normal);
        }
        console.advance(Duration::ZERO);

        let lines = texts(&console);
        assert_eq!(lines.len(), MAX_CONSOLE_LINES);
        assert_eq!(lines[0], "line 50");
    }
}
