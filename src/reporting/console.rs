use console::style;

/// Leveled operator output: `[+]` success, `[-]` error, `[!]` warning and
/// `[*]` info. Quiet mode drops info lines only.
#[derive(Debug, Clone, Copy, Default)]
pub struct Reporter {
    quiet: bool,
}

impl Reporter {
    pub fn new(quiet: bool) -> Self {
        Self { quiet }
    }

    pub fn success(&self, message: impl AsRef<str>) {
        println!("{} {}", style("[+]").green().bold(), message.as_ref());
    }

    pub fn error(&self, message: impl AsRef<str>) {
        println!("{} {}", style("[-]").red().bold(), message.as_ref());
    }

    pub fn warning(&self, message: impl AsRef<str>) {
        println!("{} {}", style("[!]").yellow().bold(), message.as_ref());
    }

    pub fn info(&self, message: impl AsRef<str>) {
        if !self.quiet {
            println!("{} {}", style("[*]").cyan(), message.as_ref());
        }
    }

    pub fn section(&self, title: &str) {
        if self.quiet {
            return;
        }
        println!();
        println!("{}", style(title).white().bold());
        println!("{}", style("\u{2500}".repeat(title.chars().count().max(20))).dim());
    }

    /// Print pre-formatted lines verbatim.
    pub fn block(&self, text: &str) {
        println!("{}", text);
    }
}
