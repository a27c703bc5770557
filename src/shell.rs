use crate::catalog::CatalogError;
use std::fmt::Display;
use std::io;
use std::io::{BufRead, Write};
use tracing::{debug, error};

pub mod command;
pub mod desk;

pub use command::Command;
pub use desk::{Desk, LibraryDesk, StudentDesk};

#[derive(Debug, thiserror::Error)]
pub enum ShellError {
    #[error("{0}")]
    Parse(String),

    #[error(transparent)]
    Catalog(#[from] CatalogError),

    #[error("Could not export to {path}: {source}")]
    Export {
        path: String,
        #[source]
        source: io::Error,
    },

    #[error(transparent)]
    Io(#[from] io::Error),

    #[error("End of input")]
    EndOfInput,
}

/// 명령 줄을 읽고 결과를 출력하는 콘솔
pub struct Console<'a> {
    input: &'a mut dyn BufRead,
    output: &'a mut dyn Write,
}

impl<'a> Console<'a> {
    pub fn new(input: &'a mut dyn BufRead, output: &'a mut dyn Write) -> Self {
        Self { input, output }
    }

    /// 한 줄을 읽는다. 입력이 끝났으면 `None`을 반환한다.
    pub fn read_line(&mut self) -> io::Result<Option<String>> {
        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim_end_matches(['\r', '\n']).to_owned()))
    }

    /// 질문을 출력하고 앞뒤 공백을 제거한 답을 읽는다.
    pub fn ask(&mut self, question: &str) -> Result<String, ShellError> {
        write!(self.output, "{}", question)?;
        self.output.flush()?;

        match self.read_line()? {
            Some(answer) => Ok(answer.trim().to_owned()),
            None => Err(ShellError::EndOfInput),
        }
    }

    /// 비어있지 않은 답을 얻을 때까지 다시 묻는다.
    pub fn ask_required(&mut self, question: &str, field: &str) -> Result<String, ShellError> {
        loop {
            let answer = self.ask(question)?;
            if !answer.is_empty() {
                return Ok(answer);
            }
            self.say(format!("{} cannot be empty.", field))?;
        }
    }

    pub fn say(&mut self, message: impl Display) -> io::Result<()> {
        writeln!(self.output, "{}", message)
    }

    pub fn output(&mut self) -> &mut dyn Write {
        &mut *self.output
    }
}

/// 명령 루프를 실행한다.
///
/// 명령 처리 중 생긴 오류는 출력한 뒤 다음 명령을 받는다. `exit` 명령이나 입력의 끝에서 전체 스냅샷을 저장하고 끝낸다.
/// 콘솔 자체의 입출력 오류만 루프를 멈춘다.
pub fn run<D: Desk>(desk: &mut D, console: &mut Console) -> Result<(), ShellError> {
    console.say(desk.banner())?;
    console.say("Type 'help' for the command list.")?;

    loop {
        write!(console.output(), "\n> ")?;
        console.output().flush()?;

        let Some(line) = console.read_line()? else {
            console.say("")?;
            break;
        };
        if line.trim().is_empty() {
            continue;
        }

        let command = match Command::parse(&line) {
            Ok(command) => command,
            Err(e) => {
                console.say(format!("Error: {}", e))?;
                continue;
            }
        };
        if command == Command::Exit {
            break;
        }

        debug!(command = ?command, "명령을 실행합니다.");
        match desk.execute(command, console) {
            Ok(()) => {}
            Err(ShellError::EndOfInput) => break,
            Err(ShellError::Io(e)) => return Err(ShellError::Io(e)),
            Err(e) => console.say(format!("Error: {}", e))?,
        }
    }

    match desk.save() {
        Ok(count) => {
            console.say(format!("Saved {} record(s). Goodbye!", count))?;
            Ok(())
        }
        Err(e) => {
            error!(error = %e, "종료 중 저장에 실패했습니다.");
            console.say(format!("Error: {}", e))?;
            Err(e)
        }
    }
}
