use std::collections::HashMap;

use crate::error;
use crate::host::document::Document;

/// 命令回调, 执行时拿到当前的活动文档作为上下文.
pub type CommandCallback = Box<dyn FnMut(Option<&Document>)>;

/// 命令注册表, 宿主用它支持手动触发.
#[derive(Default)]
pub struct CommandRegistry {
    commands: HashMap<String, CommandCallback>,
}

impl CommandRegistry {
    pub fn new() -> CommandRegistry {
        CommandRegistry::default()
    }

    /// 注册命令, 同名命令直接覆盖.
    pub fn register(&mut self, name: impl Into<String>, callback: CommandCallback) {
        self.commands.insert(name.into(), callback);
    }

    /// 执行命令.
    ///
    /// # Errors
    ///
    /// - [`error::Error::UnknownCommand`]: 命令没有注册过.
    pub fn execute(&mut self, name: &str, active: Option<&Document>) -> error::Result<()> {
        match self.commands.get_mut(name) {
            Some(callback) => {
                log::debug!("execute command {:?}", name);
                callback(active);
                Ok(())
            }
            None => Err(error::Error::UnknownCommand { name: name.to_string() }),
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.commands.contains_key(name)
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;
    use std::rc::Rc;

    use super::*;
    use crate::host::document::DocumentKind;

    #[test]
    fn registered_command_runs_with_active_document() {
        let mut registry = CommandRegistry::new();
        let seen = Rc::new(Cell::new(false));
        let seen2 = Rc::clone(&seen);
        registry.register(
            "probe",
            Box::new(move |doc| seen2.set(doc.is_some())),
        );

        let doc = Document::from_text("a.md", DocumentKind::Markdown, "晴天");
        registry.execute("probe", Some(&doc)).unwrap();
        assert!(seen.get());
        registry.execute("probe", None).unwrap();
        assert!(!seen.get());
    }

    #[test]
    fn unknown_command_is_an_error() {
        let mut registry = CommandRegistry::new();
        assert!(matches!(
            registry.execute("nope", None),
            Err(error::Error::UnknownCommand { .. })
        ));
    }

    #[test]
    fn same_name_overwrites() {
        let mut registry = CommandRegistry::new();
        let hits = Rc::new(Cell::new(0));
        let (a, b) = (Rc::clone(&hits), Rc::clone(&hits));
        registry.register("cmd", Box::new(move |_| a.set(a.get() + 1)));
        registry.register("cmd", Box::new(move |_| b.set(b.get() + 10)));
        registry.execute("cmd", None).unwrap();
        assert_eq!(hits.get(), 10);
        assert!(registry.contains("cmd"));
    }
}
