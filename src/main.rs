use std::fs::File;
use std::path::PathBuf;

use anyhow::Context;
use log::LevelFilter;
use simplelog::{Config, WriteLogger};

use mojibar::counter::Policy;
use mojibar::host::{Viewer, ViewerBuildConfig};

struct CliArgs {
    files: Vec<PathBuf>,
    policy: Policy,
    accept_plain_text: bool,
    log_file: Option<PathBuf>,
}

fn parse_args() -> anyhow::Result<CliArgs> {
    let mut cli = CliArgs {
        files: Vec::new(),
        policy: Policy::default(),
        accept_plain_text: false,
        log_file: None,
    };
    let mut args = std::env::args().skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--policy" => {
                let name = args.next().context("--policy takes a value")?;
                cli.policy = Policy::from_name(&name)?;
            }
            "--plain" => cli.accept_plain_text = true,
            "--log" => {
                let path = args.next().context("--log takes a file path")?;
                cli.log_file = Some(PathBuf::from(path));
            }
            _ => cli.files.push(PathBuf::from(arg)),
        }
    }
    Ok(cli)
}

// 日志只能写文件, 终端的每一行都归查看器管.
fn initialize_logger(path: &PathBuf) {
    match File::create(path) {
        Ok(file) => {
            let _ = WriteLogger::init(LevelFilter::Debug, Config::default(), file);
        }
        Err(err) => eprintln!("Warning: could not create log file {:?}: {}", path, err),
    }
}

// 这里不使用 fn main() -> anyhow::Result<()> { ... } 的写法:
// build/run 的错误直接 unwrap 成 panic, 让查看器的 panic hook
// 先把终端恢复出来, 错误信息才看得到.
fn main() {
    let cli = match parse_args() {
        Ok(cli) => cli,
        Err(err) => {
            eprintln!("{:#}", err);
            std::process::exit(2);
        }
    };
    if let Some(path) = &cli.log_file {
        initialize_logger(path);
    }

    let config = ViewerBuildConfig {
        files: cli.files,
        policy: cli.policy,
        accept_plain_text: cli.accept_plain_text,
    };
    let mut viewer = Viewer::build(&config).unwrap();
    viewer.run().unwrap();
}
