use std::path::PathBuf;

use crate::shell::command::Command;

pub fn parse_command(input: &str) -> Option<Command> {
    let tokens: Vec<&str> = input.trim().split_ascii_whitespace().collect();
    if tokens.is_empty() {
        return None;
    }

    let cmd = tokens[0];
    let args = &tokens[1..];
    let inode = |i: usize| args.get(i).and_then(|s| s.parse::<u32>().ok());
    let path = |i: usize| args.get(i).map(PathBuf::from);

    match cmd {
        "help" => Some(Command::Help),
        "debug" => Some(Command::Debug),
        "format" => Some(Command::Format),
        "mount" => Some(Command::Mount),
        "unmount" => Some(Command::Unmount),
        "create" => Some(Command::Create),
        "remove" => inode(0).map(Command::Remove),
        "stat" => inode(0).map(Command::Stat),
        "cat" => inode(0).map(Command::Cat),
        "copyin" => Some(Command::CopyIn(path(0)?, inode(1)?)),
        "copyout" => Some(Command::CopyOut(inode(0)?, path(1)?)),
        "exit" | "quit" => Some(Command::Exit),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_inode_arguments() {
        assert!(matches!(parse_command("stat 3"), Some(Command::Stat(3))));
        assert!(matches!(parse_command("  remove   12 "), Some(Command::Remove(12))));
        assert!(matches!(parse_command("cat 0"), Some(Command::Cat(0))));
    }

    #[test]
    fn parses_copy_commands() {
        match parse_command("copyin notes.txt 2") {
            Some(Command::CopyIn(path, 2)) => assert_eq!(path, PathBuf::from("notes.txt")),
            other => panic!("unexpected {other:?}"),
        }
        match parse_command("copyout 1 /tmp/out.bin") {
            Some(Command::CopyOut(1, path)) => assert_eq!(path, PathBuf::from("/tmp/out.bin")),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn rejects_missing_or_malformed_arguments() {
        assert!(parse_command("").is_none());
        assert!(parse_command("stat").is_none());
        assert!(parse_command("stat abc").is_none());
        assert!(parse_command("stat -1").is_none());
        assert!(parse_command("copyin only-a-path").is_none());
        assert!(parse_command("mkdir foo").is_none());
    }

    #[test]
    fn exit_has_an_alias() {
        assert!(matches!(parse_command("exit"), Some(Command::Exit)));
        assert!(matches!(parse_command("quit"), Some(Command::Exit)));
    }
}
