use std::{
    fs::File,
    io::{self, Write},
    path::PathBuf,
    sync::Arc,
};

use anyhow::{bail, Context};
use colored::*;
use dialoguer::Confirm;
use indicatif::{ProgressBar, ProgressStyle};
use simple_fs::{BlockDevice, FileDisk, FileSystem, FileSystemError, BLOCK_SIZE};

// copyin / copyout 每次搬运的字节数
const COPY_CHUNK: usize = 4 * BLOCK_SIZE;

#[derive(Debug)]
pub enum Command {
    Help,
    Debug,
    Format,
    Mount,
    Unmount,
    Create,
    Remove(u32),
    Stat(u32),
    Cat(u32),
    CopyIn(PathBuf, u32),
    CopyOut(u32, PathBuf),
    Exit,
}

/// shell 持有的磁盘和（可能存在的）已挂载文件系统
pub struct Session {
    pub disk: Arc<FileDisk>,
    pub fs: Option<FileSystem<FileDisk>>,
}

impl Session {
    pub fn new(disk: Arc<FileDisk>) -> Self {
        Self { disk, fs: None }
    }

    fn mounted(&mut self) -> anyhow::Result<&mut FileSystem<FileDisk>> {
        self.fs
            .as_mut()
            .context("disk is not mounted, run 'mount' first")
    }
}

pub fn execute_command(cmd: &Command, session: &mut Session) -> anyhow::Result<()> {
    match cmd {
        Command::Help => print_help(),
        Command::Debug => {
            let report = FileSystem::debug(session.disk.as_ref())?;
            print!("{report}");
        }
        Command::Format => format_disk(session)?,
        Command::Mount => {
            if session.fs.is_some() {
                bail!("disk is already mounted");
            }
            session.fs = Some(FileSystem::mount(Arc::clone(&session.disk))?);
            println!("{}", "✅ disk mounted.".green());
        }
        Command::Unmount => match session.fs.take() {
            Some(fs) => {
                fs.unmount();
                println!("{}", "📤 disk unmounted.".green());
            }
            None => bail!("disk is not mounted"),
        },
        Command::Create => {
            let inode = session.mounted()?.create()?;
            println!("📝 created inode {}.", inode.to_string().green());
        }
        Command::Remove(inode) => {
            session.mounted()?.remove(*inode)?;
            println!("❌ removed inode {}.", inode.to_string().red());
        }
        Command::Stat(inode) => {
            let size = session.mounted()?.stat(*inode)?;
            println!(
                "{} {} {} {} bytes",
                "📊 inode".bright_yellow(),
                inode,
                "has size".bright_yellow(),
                size
            );
        }
        Command::Cat(inode) => {
            let fs = session.mounted()?;
            let mut stdout = io::stdout().lock();
            copy_out(&*fs, *inode, &mut stdout)?;
            stdout.flush()?;
            println!();
        }
        Command::CopyIn(path, inode) => {
            let data = std::fs::read(path)
                .with_context(|| format!("cannot read {}", path.display()))?;
            let copied = copy_in(session.mounted()?, *inode, &data)?;
            println!("{} bytes copied", copied.to_string().cyan());
        }
        Command::CopyOut(inode, path) => {
            let fs = session.mounted()?;
            let mut file = File::create(path)
                .with_context(|| format!("cannot create {}", path.display()))?;
            let copied = copy_out(&*fs, *inode, &mut file)?;
            println!("{} bytes copied", copied.to_string().cyan());
        }
        Command::Exit => {
            let stats = session.disk.stats();
            println!("{} disk block reads", stats.reads);
            println!("{} disk block writes", stats.writes);
        }
    }

    Ok(())
}

fn format_disk(session: &mut Session) -> anyhow::Result<()> {
    if session.fs.is_some() {
        bail!("unmount the disk before formatting it");
    }

    let confirmed = Confirm::new()
        .with_prompt(format!(
            "Format {}? All data on it will be lost",
            session.disk.path().display()
        ))
        .default(false)
        .interact()?;
    if !confirmed {
        println!("{}", "format cancelled.".bright_black());
        return Ok(());
    }

    let pb = ProgressBar::new(session.disk.block_count() as u64);
    pb.set_style(
        ProgressStyle::with_template("[{bar:40.green/black}] {pos:>5}/{len} blocks {msg}")?
            .progress_chars("#>-"),
    );

    let result = FileSystem::format_with_progress(session.disk.as_ref(), |done, _| {
        pb.set_position(done as u64)
    });
    match result {
        Ok(()) => {
            pb.finish_with_message("✅ disk formatted.");
            Ok(())
        }
        Err(e) => {
            pb.abandon_with_message("❌ format failed.");
            Err(e.into())
        }
    }
}

/// 把主机上的数据写入 inode，返回实际写入的字节数
fn copy_in<D: BlockDevice>(fs: &mut FileSystem<D>, inode: u32, data: &[u8]) -> anyhow::Result<usize> {
    let mut offset = 0;
    for chunk in data.chunks(COPY_CHUNK) {
        match fs.write(inode, chunk, offset) {
            Ok(written) => {
                offset += written;
                if written < chunk.len() {
                    println!("{}", "⚠️  file truncated: inode is full".yellow());
                    break;
                }
            }
            // 之前的块已经写入，只报告部分成功
            Err(e) if offset > 0 => {
                println!("{} {}", "⚠️  copy stopped early:".yellow(), e);
                break;
            }
            Err(e) => return Err(e.into()),
        }
    }
    Ok(offset)
}

/// 把 inode 的全部内容写到 `out`，返回字节数
fn copy_out<D: BlockDevice>(
    fs: &FileSystem<D>,
    inode: u32,
    out: &mut impl Write,
) -> anyhow::Result<usize> {
    let size = fs.stat(inode)?;
    let mut buf = vec![0u8; COPY_CHUNK];
    let mut offset = 0;

    while offset < size {
        let read = match fs.read(inode, &mut buf, offset) {
            Ok(0) | Err(FileSystemError::OffsetBeyondEnd { .. }) => break,
            Ok(read) => read,
            Err(e) => return Err(e.into()),
        };
        out.write_all(&buf[..read])?;
        offset += read;
    }
    Ok(offset)
}

fn print_help() {
    println!("{}", "📘 SimpleFS Commands".bright_cyan().bold());
    println!(
        "{}",
        "
  debug                    Show superblock and valid inodes
  format                   Format the disk
  mount                    Mount the disk
  unmount                  Unmount the disk
  create                   Allocate a new inode
  remove  <inode>          Remove an inode and free its blocks
  stat    <inode>          Show inode size
  cat     <inode>          Print inode contents
  copyin  <file> <inode>   Copy a host file into an inode
  copyout <inode> <file>   Copy inode contents to a host file
  help                     Show this help message
  exit                     Quit the shell
"
        .bright_black()
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mounted_session() -> (tempfile::TempDir, FileSystem<FileDisk>) {
        let dir = tempfile::tempdir().unwrap();
        let disk = Arc::new(FileDisk::open(dir.path().join("disk.img"), 20).unwrap());
        FileSystem::format(disk.as_ref()).unwrap();
        let fs = FileSystem::mount(disk).unwrap();
        (dir, fs)
    }

    #[test]
    fn copy_in_then_copy_out_preserves_bytes() {
        let (_dir, mut fs) = mounted_session();
        let inode = fs.create().unwrap();
        let data: Vec<u8> = (0..10_000u32).map(|i| (i % 251) as u8).collect();

        assert_eq!(copy_in(&mut fs, inode, &data).unwrap(), data.len());

        let mut out = Vec::new();
        assert_eq!(copy_out(&fs, inode, &mut out).unwrap(), data.len());
        assert_eq!(out, data);
    }

    #[test]
    fn copy_in_stops_at_inode_capacity() {
        let (_dir, mut fs) = mounted_session();
        let inode = fs.create().unwrap();
        let data = vec![7u8; simple_fs::MAX_FILE_SIZE + 100];

        assert_eq!(copy_in(&mut fs, inode, &data).unwrap(), simple_fs::MAX_FILE_SIZE);
        assert_eq!(fs.stat(inode).unwrap(), simple_fs::MAX_FILE_SIZE);
    }

    #[test]
    fn copy_out_of_empty_inode_writes_nothing() {
        let (_dir, mut fs) = mounted_session();
        let inode = fs.create().unwrap();

        let mut out = Vec::new();
        assert_eq!(copy_out(&fs, inode, &mut out).unwrap(), 0);
        assert!(out.is_empty());
    }
}
