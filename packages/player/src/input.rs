use looper_player_core::PlayerMessage;

/// A line typed by the user.
#[derive(Debug, PartialEq)]
pub enum Input {
    Send(PlayerMessage),
    List,
    Help,
    Quit,
    Unknown(String),
}

pub const HELP: &str = "\
commands:
  <n>   select segment n (again to pause/resume)
  m     toggle repeat/continuous
  s     show status
  l     list segments
  h     show this help
  q     quit";

pub fn parse_input(line: &str) -> Option<Input> {
    let line = line.trim();
    if line.is_empty() {
        return None;
    }

    if let Ok(index) = line.parse::<usize>() {
        return Some(Input::Send(PlayerMessage::SelectSegment { index }));
    }

    Some(match line.to_ascii_lowercase().as_str() {
        "m" | "mode" => Input::Send(PlayerMessage::ToggleMode),
        "s" | "status" => Input::Send(PlayerMessage::SyncStatus),
        "l" | "list" => Input::List,
        "h" | "help" | "?" => Input::Help,
        "q" | "quit" | "exit" => Input::Quit,
        _ => Input::Unknown(line.to_string()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_commands() {
        assert_eq!(parse_input("   "), None);
        assert_eq!(
            parse_input(" 3 "),
            Some(Input::Send(PlayerMessage::SelectSegment { index: 3 }))
        );
        assert_eq!(
            parse_input("M"),
            Some(Input::Send(PlayerMessage::ToggleMode))
        );
        assert_eq!(
            parse_input("status"),
            Some(Input::Send(PlayerMessage::SyncStatus))
        );
        assert_eq!(parse_input("l"), Some(Input::List));
        assert_eq!(parse_input("q"), Some(Input::Quit));
        assert_eq!(parse_input("-1"), Some(Input::Unknown("-1".into())));
    }

    #[test]
    fn help_lists_every_command() {
        assert_eq!(parse_input("h"), Some(Input::Help));
        for cmd in ["<n>", "m", "s", "l", "h", "q"] {
            assert!(
                HELP.lines().any(|l| l.trim_start().starts_with(cmd)),
                "missing {cmd}"
            );
        }
    }
}
