//! Line commands accepted by the terminal driver.

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Input {
    Play(usize),
    Move { from: usize, to: usize },
    Next,
    Prev,
    TogglePause,
    SetPlaying(bool),
    Colored(bool),
    ShowQueue,
    SaveQueue(String),
    ShowPlaylists,
    ShowHistory,
    ClearHistory,
    Refresh,
    Help,
    Quit,
}

pub const HELP: &str = "\
commands:
  play <n>          play the song at position n
  move <from> <to>  move a song within the queue
  next | prev       skip forward / back
  toggle            play/pause
  pause | resume
  color on|off      tint the notification with the album accent
  queue             list the queue
  save <name>       add the whole queue to playlist <name>
  playlists         list saved playlists
  history           list recently played songs
  clear-history
  refresh           reload the queue from the engine
  quit";

impl Input {
    pub fn parse(line: &str) -> Result<Self, String> {
        let mut words = line.split_whitespace();
        let Some(cmd) = words.next() else {
            return Err("empty command".to_string());
        };
        let args: Vec<&str> = words.collect();

        let index = |i: usize| -> Result<usize, String> {
            let raw = args
                .get(i)
                .ok_or_else(|| format!("`{}` needs more arguments", cmd))?;
            raw.parse::<usize>()
                .map_err(|_| format!("`{}` is not a queue position", raw))
        };

        let input = match cmd.to_lowercase().as_str() {
            "play" | "p" => Input::Play(index(0)?),
            "move" | "mv" => Input::Move {
                from: index(0)?,
                to: index(1)?,
            },
            "next" | "n" => Input::Next,
            "prev" => Input::Prev,
            "toggle" | "t" => Input::TogglePause,
            "pause" => Input::SetPlaying(false),
            "resume" => Input::SetPlaying(true),
            "color" => match args.first().copied() {
                Some("on") => Input::Colored(true),
                Some("off") => Input::Colored(false),
                _ => return Err("usage: color on|off".to_string()),
            },
            "queue" | "q" => Input::ShowQueue,
            "save" => {
                if args.is_empty() {
                    return Err("usage: save <playlist name>".to_string());
                }
                Input::SaveQueue(args.join(" "))
            }
            "playlists" => Input::ShowPlaylists,
            "history" => Input::ShowHistory,
            "clear-history" => Input::ClearHistory,
            "refresh" => Input::Refresh,
            "help" | "?" => Input::Help,
            "quit" | "exit" => Input::Quit,
            other => return Err(format!("unknown command `{}` (try `help`)", other)),
        };
        Ok(input)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_commands() {
        assert_eq!(Input::parse("play 3"), Ok(Input::Play(3)));
        assert_eq!(Input::parse("  MOVE 0 3 "), Ok(Input::Move { from: 0, to: 3 }));
        assert_eq!(Input::parse("color off"), Ok(Input::Colored(false)));
        assert_eq!(Input::parse("pause"), Ok(Input::SetPlaying(false)));
        assert_eq!(Input::parse("quit"), Ok(Input::Quit));
        assert_eq!(
            Input::parse("save Road  Trip"),
            Ok(Input::SaveQueue("Road Trip".to_string()))
        );
    }

    #[test]
    fn test_parse_errors() {
        assert!(Input::parse("").is_err());
        assert!(Input::parse("move 1").is_err());
        assert!(Input::parse("play -1").is_err());
        assert!(Input::parse("color maybe").is_err());
        assert!(Input::parse("save").is_err());
        assert!(Input::parse("dance").is_err());
    }
}
