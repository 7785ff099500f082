use std::io;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("IOError occurred: {0:?}")]
    IOError(#[from] io::Error),

    // 配置解析.
    #[error("Unknown counting policy {name:?}, expected one of: chars, ascii, kanji.")]
    UnknownPolicy { name: String },

    // 命令注册表.
    #[error("Unknown command {name:?}.")]
    UnknownCommand { name: String },
}

pub type Result<T> = std::result::Result<T, Error>;
