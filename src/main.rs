use std::{io::Write, path::PathBuf, sync::Arc};

use anyhow::Context;
use clap::Parser;
use simple_fs::FileDisk;

use crate::shell::start_shell;

mod shell;

/// SimpleFS 交互式 shell
#[derive(Debug, Parser)]
#[command(name = "sfssh", version, about = "Interactive shell for SimpleFS disk images")]
struct Cli {
    /// 磁盘镜像路径，不存在时自动创建
    disk: PathBuf,

    /// 磁盘块数（每块 4KB）
    blocks: u32,

    /// 跳过启动画面
    #[arg(long)]
    no_banner: bool,
}

fn main() -> anyhow::Result<()> {
    init_logger();
    let cli = Cli::parse();

    let disk = FileDisk::open(&cli.disk, cli.blocks)
        .with_context(|| format!("cannot open disk image {}", cli.disk.display()))?;

    start_shell(Arc::new(disk), !cli.no_banner)
}

// 日志级别由 RUST_LOG 控制，默认只输出 warn 及以上
fn init_logger() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"))
        .format(|buf, record| {
            writeln!(
                buf,
                "{} [{:<5}] {}",
                chrono::Local::now().format("%H:%M:%S%.3f"),
                record.level(),
                record.args()
            )
        })
        .init();
}
