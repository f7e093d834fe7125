use crossterm::cursor::SetCursorStyle;

/// a line typed at the console prompt.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Command {
    Spec,
    Cls,
    Help,
    ClearTemp,
    FlushDns,
    Speed(i64),
    ToggleCps,
    Cursor(CaretStyle),
    Unknown(String),
}

/// terminal caret shapes the console can switch to.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum CaretStyle {
    Default,
    Block,
    Bar,
    Underline,
}

pub const HELP: &str = "\
/spec          type the system summary
/cls           clear the console
/temp          clear temp files
/dns           flush the dns cache
/speed N       apply pointer speed N (1-20)
/cps           start or stop the cps test
/cursor STYLE  caret: block, bar, underline, default
/help          this list";

impl Command {
    /// returns `None` for a blank line.
    pub fn parse(line: &str) -> Option<Self> {
        let line = line.trim();
        if line.is_empty() {
            return None;
        }

        let mut words = line.split_whitespace();
        let name = words.next()?.to_ascii_lowercase();
        let arg = words.next();
        let extra = words.next();

        let unknown = || Command::Unknown(line.to_string());
        let command = match (name.as_str(), arg, extra) {
            ("/spec", None, None) => Command::Spec,
            ("/cls", None, None) => Command::Cls,
            ("/help", None, None) => Command::Help,
            ("/temp", None, None) => Command::ClearTemp,
            ("/dns", None, None) => Command::FlushDns,
            ("/cps", None, None) => Command::ToggleCps,
            ("/speed", Some(n), None) => match n.parse::<i64>() {
                Ok(n) => Command::Speed(n),
                Err(_) => unknown(),
            },
            ("/cursor", Some(style), None) => match CaretStyle::parse(style) {
                Some(style) => Command::Cursor(style),
                None => unknown(),
            },
            _ => unknown(),
        };
        Some(command)
    }
}

impl CaretStyle {
    fn parse(word: &str) -> Option<Self> {
        match word.to_ascii_lowercase().as_str() {
            "default" => Some(CaretStyle::Default),
            "block" => Some(CaretStyle::Block),
            "bar" => Some(CaretStyle::Bar),
            "underline" => Some(CaretStyle::Underline),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            CaretStyle::Default => "default",
            CaretStyle::Block => "block",
            CaretStyle::Bar => "bar",
            CaretStyle::Underline => "underline",
        }
    }

    pub fn to_crossterm(self) -> SetCursorStyle {
        match self {
            CaretStyle::Default => SetCursorStyle::DefaultUserShape,
            CaretStyle::Block => SetCursorStyle::BlinkingBlock,
            CaretStyle::Bar => SetCursorStyle::BlinkingBar,
            CaretStyle::Underline => SetCursorStyle::BlinkingUnderScore,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_lines_are_ignored() {
        assert_eq!(Command::parse(""), None);
        assert_eq!(Command::parse("   "), None);
    }

    #[test]
    fn parses_every_command() {
        assert_eq!(Command::parse("/spec"), Some(Command::Spec));
        assert_eq!(Command::parse("  /cls "), Some(Command::Cls));
        assert_eq!(Command::parse("/help"), Some(Command::Help));
        assert_eq!(Command::parse("/temp"), Some(Command::ClearTemp));
        assert_eq!(Command::parse("/dns"), Some(Command::FlushDns));
        assert_eq!(Command::parse("/cps"), Some(Command::ToggleCps));
        assert_eq!(Command::parse("/speed 15"), Some(Command::Speed(15)));
        assert_eq!(Command::parse("/SPEED -3"), Some(Command::Speed(-3)));
        assert_eq!(
            Command::parse("/cursor bar"),
            Some(Command::Cursor(CaretStyle::Bar))
        );
    }

    #[test]
    fn anything_else_is_unknown() {
        for line in ["dir", "/spec now", "/speed fast", "/speed", "/cursor hand"] {
            assert_eq!(
                Command::parse(line),
                Some(Command::Unknown(line.to_string())),
                "{line}"
            );
        }
    }

    #[test]
    fn help_mentions_every_command() {
        for name in ["/spec", "/cls", "/temp", "/dns", "/speed", "/cps", "/cursor", "/help"] {
            assert!(HELP.contains(name), "{name}");
        }
    }
}
