use crate::item::SortKey;
use crate::shell::ShellError;

/// 한 줄 명령
///
/// 키 인자가 생략된 명령은 실행할 때 키를 다시 묻는다.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Add,
    Update(Option<String>),
    Delete(Option<String>),
    Search(Option<String>),
    Display(SortKey),
    Export(Option<String>),

    /// `borrow`, `checkout`
    Borrow(Option<String>),
    Return(Option<String>),
    List,
    Help,

    /// `exit`, `quit`
    Exit,
}

impl Command {
    /// 명령 줄을 해석한다. 명령어는 대소문자를 구분하지 않고, 나머지 입력은 공백 하나로 이어 붙여 인자로 사용한다.
    ///
    /// # Example
    /// ```
    /// use record_desk_rust::item::SortKey;
    /// use record_desk_rust::shell::command::Command;
    ///
    /// assert_eq!(Command::parse("DISPLAY name").unwrap(), Command::Display(SortKey::Name));
    /// assert_eq!(Command::parse("checkout  dune messiah").unwrap(), Command::Borrow(Some("dune messiah".to_owned())));
    /// ```
    pub fn parse(line: &str) -> Result<Command, ShellError> {
        let parts: Vec<&str> = line.split_whitespace().collect();
        let Some((word, args)) = parts.split_first() else {
            return Err(ShellError::Parse("Empty command".into()));
        };
        let argument = if args.is_empty() {
            None
        } else {
            Some(args.join(" "))
        };

        match word.to_lowercase().as_str() {
            "add" => no_argument(Command::Add, word, args),
            "update" => Ok(Command::Update(argument)),
            "delete" => Ok(Command::Delete(argument)),
            "search" => Ok(Command::Search(argument)),
            "display" => match args {
                [] => Ok(Command::Display(SortKey::default())),
                [key] => SortKey::try_from(*key)
                    .map(Command::Display)
                    .map_err(|_| ShellError::Parse(format!("display sorts by 'id' or 'name', not '{}'", key))),
                _ => Err(ShellError::Parse("display takes at most one sort key".into())),
            },
            "export" => Ok(Command::Export(argument)),
            "borrow" | "checkout" => Ok(Command::Borrow(argument)),
            "return" => Ok(Command::Return(argument)),
            "list" => no_argument(Command::List, word, args),
            "help" | "?" => Ok(Command::Help),
            "exit" | "quit" => Ok(Command::Exit),
            _ => Err(ShellError::Parse(format!("Unknown command: {} (type 'help' for the command list)", word))),
        }
    }
}

fn no_argument(command: Command, word: &str, args: &[&str]) -> Result<Command, ShellError> {
    if args.is_empty() {
        Ok(command)
    } else {
        Err(ShellError::Parse(format!("{} takes no arguments", word)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_error(line: &str) -> String {
        match Command::parse(line) {
            Err(ShellError::Parse(message)) => message,
            other => panic!("expected parse error for {:?}, got {:?}", line, other),
        }
    }

    #[test]
    fn plain_commands() {
        assert_eq!(Command::parse("add").unwrap(), Command::Add);
        assert_eq!(Command::parse("  LIST ").unwrap(), Command::List);
        assert_eq!(Command::parse("help").unwrap(), Command::Help);
        assert_eq!(Command::parse("?").unwrap(), Command::Help);
        assert_eq!(Command::parse("exit").unwrap(), Command::Exit);
        assert_eq!(Command::parse("Quit").unwrap(), Command::Exit);
    }

    #[test]
    fn key_arguments_are_optional() {
        assert_eq!(Command::parse("update").unwrap(), Command::Update(None));
        assert_eq!(Command::parse("update 42").unwrap(), Command::Update(Some("42".to_owned())));
        assert_eq!(Command::parse("delete 42").unwrap(), Command::Delete(Some("42".to_owned())));
        assert_eq!(Command::parse("return").unwrap(), Command::Return(None));
        assert_eq!(Command::parse("borrow 978-0441").unwrap(), Command::Borrow(Some("978-0441".to_owned())));
        assert_eq!(Command::parse("export out.txt").unwrap(), Command::Export(Some("out.txt".to_owned())));
    }

    #[test]
    fn multi_word_arguments_are_joined() {
        assert_eq!(Command::parse("search  ann   lee").unwrap(), Command::Search(Some("ann lee".to_owned())));
        assert_eq!(Command::parse("return The Left Hand").unwrap(), Command::Return(Some("The Left Hand".to_owned())));
    }

    #[test]
    fn display_sort_keys() {
        assert_eq!(Command::parse("display").unwrap(), Command::Display(SortKey::Id));
        assert_eq!(Command::parse("display ID").unwrap(), Command::Display(SortKey::Id));
        assert_eq!(Command::parse("display name").unwrap(), Command::Display(SortKey::Name));
        assert!(parse_error("display grade").contains("'grade'"));
        assert!(parse_error("display id name").contains("at most one"));
    }

    #[test]
    fn rejects_unknown_and_malformed_commands() {
        assert_eq!(parse_error("   "), "Empty command");
        assert!(parse_error("remove 1").starts_with("Unknown command: remove"));
        assert!(parse_error("add 1").contains("no arguments"));
        assert!(parse_error("list all").contains("no arguments"));
    }
}
