use anstyle::{AnsiColor, Color, Style};

/// Section headings in help output ("Usage:", "Options:", ...)
pub const HEADING: Style = Style::new().bold().underline();

/// Option names, argument names and subcommand names in help tables
pub const LITERAL: Style = Style::new()
    .bold()
    .fg_color(Some(Color::Ansi(AnsiColor::Cyan)));
