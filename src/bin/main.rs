use std::{
    error::Error,
    fs,
    io::{self, Write},
    process::ExitCode,
};

use lolc::{diagnostic::SourceFile, vm::Machine, RunError};

fn main() -> ExitCode {
    match run() {
        Ok(code) => code,
        Err(error) => {
            eprintln!("failed to run: {error}");
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<ExitCode, Box<dyn Error>> {
    let Some(path) = std::env::args().nth(1) else {
        eprintln!("usage: lolc <file.lol>");
        return Ok(ExitCode::from(2));
    };
    let text = fs::read_to_string(&path)?;
    let file = SourceFile::new(path, text);

    let compilation = lolc::compile(&file);
    for diagnostic in &compilation.diagnostics {
        eprintln!("{diagnostic}");
    }
    let Some(artifact) = compilation.artifact else {
        return Ok(ExitCode::FAILURE);
    };

    let stdin = io::stdin().lock();
    let mut stdout = io::stdout().lock();
    let result = Machine::new(&artifact, stdin, &mut stdout).run();
    stdout.flush()?;
    if let Err(fault) = result {
        let error = RunError::Fault {
            file: file.name().into(),
            location: file.location(fault.span),
            fault,
        };
        eprintln!("{error}");
        return Ok(ExitCode::FAILURE);
    }
    Ok(ExitCode::SUCCESS)
}
