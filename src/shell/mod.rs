pub mod command;
pub mod parse;

use std::{
    io::{stdout, Write},
    path::PathBuf,
    sync::Arc,
};

use colored::*;
use crossterm::{
    cursor, execute,
    style::{Color, Print, ResetColor, SetForegroundColor},
    terminal::{Clear, ClearType},
};
use log::warn;
use reedline::{
    DefaultCompleter, DefaultPrompt, DefaultPromptSegment, FileBackedHistory, Reedline, Signal,
};
use simple_fs::FileDisk;

use crate::shell::{
    command::{execute_command, Command, Session},
    parse::parse_command,
};

const COMMANDS: [&str; 12] = [
    "help", "debug", "format", "mount", "unmount", "create", "remove", "stat", "cat", "copyin",
    "copyout", "exit",
];

pub fn start_shell(disk: Arc<FileDisk>, banner: bool) -> anyhow::Result<()> {
    if banner {
        boot_banner(&disk)?;
    }

    let username = whoami::username();
    let hostname = whoami::fallible::hostname().unwrap_or_else(|_| "localhost".to_string());
    let mut session = Session::new(disk);

    println!(
        "{}",
        "Type 'help' for available commands. Use ↑↓ for history, Tab for auto-completion.\n"
            .bright_black()
    );

    let mut line_editor = Reedline::create();

    // 历史记录保存在 home 目录
    let history_path = dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".sfssh_history");
    match FileBackedHistory::with_file(100, history_path) {
        Ok(history) => line_editor = line_editor.with_history(Box::new(history)),
        Err(e) => warn!("Shell history disabled: {e}"),
    }

    // 命令补全
    let completer =
        DefaultCompleter::new_with_wordlen(COMMANDS.iter().map(|c| c.to_string()).collect(), 2);
    line_editor = line_editor.with_completer(Box::new(completer));

    loop {
        let state = if session.fs.is_some() { "mounted" } else { "unmounted" };
        let prompt = DefaultPrompt::new(
            DefaultPromptSegment::Basic(format!("{}@{} sfs", username, hostname)),
            DefaultPromptSegment::Basic(state.to_string()),
        );

        match line_editor.read_line(&prompt) {
            Ok(Signal::Success(buffer)) => {
                let trimmed = buffer.trim();
                if trimmed.is_empty() {
                    continue;
                }

                match parse_command(trimmed) {
                    Some(cmd) => {
                        if let Err(e) = execute_command(&cmd, &mut session) {
                            println!("{} {:#}", "❌ Error:".red().bold(), e);
                        }
                        if matches!(cmd, Command::Exit) {
                            break;
                        }
                    }
                    None => println!(
                        "{}",
                        "⚠️  Unknown command or bad arguments. Type 'help' for command list."
                            .yellow()
                    ),
                }
            }
            Ok(Signal::CtrlC) => {
                println!();
                continue;
            }
            Ok(Signal::CtrlD) => {
                execute_command(&Command::Exit, &mut session)?;
                break;
            }
            Err(e) => {
                println!("Error reading line: {}", e);
                break;
            }
        }
    }

    println!("{}", "👋 Bye!".bright_yellow());
    Ok(())
}

/// 启动画面
fn boot_banner(disk: &FileDisk) -> anyhow::Result<()> {
    let mut stdout = stdout();
    execute!(
        stdout,
        Clear(ClearType::All),
        cursor::MoveTo(0, 0),
        SetForegroundColor(Color::Cyan),
        Print(format!("Welcome to SimpleFS v{}\n", env!("CARGO_PKG_VERSION"))),
        ResetColor
    )?;
    println!(
        "{} {} ({} blocks)",
        "💾 disk:".bright_yellow(),
        disk.path().display(),
        simple_fs::BlockDevice::block_count(disk)
    );
    stdout.flush()?;
    Ok(())
}
