use std::fmt::Display;

use console::{style, StyledObject};

type Styled = StyledObject<String>;

/// Tool name in the banner.
pub fn title(text: impl Display) -> Styled {
    style(text.to_string()).magenta().bold()
}

/// Secondary banner text such as the version.
pub fn muted(text: impl Display) -> Styled {
    style(text.to_string()).dim()
}

pub fn section_heading(text: impl Display) -> Styled {
    style(text.to_string()).bright().underlined()
}

/// A job that is still being measured.
pub fn in_progress(text: impl Display) -> Styled {
    style(text.to_string()).bright().yellow()
}

pub fn completed(text: impl Display) -> Styled {
    style(text.to_string()).bright().green()
}

/// A run that stopped before every job was measured.
pub fn stopped(text: impl Display) -> Styled {
    style(text.to_string()).bright().red()
}
