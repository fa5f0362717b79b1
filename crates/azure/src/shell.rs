//! Small builder for bash text.
//!
//! Quoting rules: identifiers, names and secrets go through [`dq`]; values with
//! characters bash would interpret (JSON lists) go through [`sq`]; numbers are
//! written bare via their `Display` impl.

use std::fmt::{self, Write};

/// Double-quoted literal with `\`, `"`, `$` and backtick escaped.
pub fn dq(value: &str) -> String {
    format!("\"{}\"", dq_escape(value))
}

/// The inside of [`dq`], for splicing a value into a larger double-quoted string.
pub fn dq_escape(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        if matches!(c, '\\' | '"' | '$' | '`') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

/// Single-quoted literal; embedded quotes become `'\''`.
pub fn sq(value: &str) -> String {
    format!("'{}'", value.replace('\'', r"'\''"))
}

/// Quoted reference to a shell variable, e.g. `"$RG_NAME"`.
pub fn var(name: &str) -> String {
    format!("\"${name}\"")
}

/// One `az` invocation.
#[derive(Debug, Clone)]
pub struct Command {
    head: String,
    args: Vec<String>,
}

impl Command {
    pub fn az(subcommand: &str) -> Self {
        Self { head: format!("az {subcommand}"), args: Vec::new() }
    }

    /// `value` is written as given; quote it first where needed.
    pub fn opt(mut self, flag: &str, value: impl fmt::Display) -> Self {
        self.args.push(format!("{flag} {value}"));
        self
    }

    pub fn flag(mut self, flag: &str) -> Self {
        self.args.push(flag.to_string());
        self
    }

    pub fn arg(mut self, value: impl Into<String>) -> Self {
        self.args.push(value.into());
        self
    }

    pub fn table(self) -> Self { self.opt("-o", "table") }

    /// `show`/`list` subcommands never change a resource.
    pub fn is_read_only(&self) -> bool {
        matches!(self.head.rsplit(' ').next(), Some("show" | "list"))
    }

    pub fn tsv(self, query: &str) -> Self { self.opt("--query", query).opt("-o", "tsv") }

    /// One argument per line joined with `\` continuations.
    pub fn multiline(&self) -> String {
        let mut out = self.head.clone();
        for a in &self.args {
            out.push_str(" \\\n  ");
            out.push_str(a);
        }
        out
    }

    pub fn inline(&self) -> String {
        let mut out = self.head.clone();
        for a in &self.args {
            out.push(' ');
            out.push_str(a);
        }
        out
    }
}

/// Accumulates the text of one section.
#[derive(Debug, Default)]
pub struct Script {
    buf: String,
}

impl Script {
    /// Starts a section with its banner.
    pub fn section(title: &str) -> Self {
        let mut s = Script::default();
        writeln!(s.buf, "# ===== {title} =====").ok();
        s
    }

    pub fn blank(&mut self) -> &mut Self {
        self.buf.push('\n');
        self
    }

    pub fn comment(&mut self, text: &str) -> &mut Self {
        if text.is_empty() {
            self.buf.push_str("#\n");
        } else {
            writeln!(self.buf, "# {text}").ok();
        }
        self
    }

    pub fn line(&mut self, text: impl AsRef<str>) -> &mut Self {
        self.buf.push_str(text.as_ref());
        self.buf.push('\n');
        self
    }

    pub fn assign(&mut self, name: &str, rendered: impl fmt::Display) -> &mut Self {
        writeln!(self.buf, "{name}={rendered}").ok();
        self
    }

    pub fn run(&mut self, cmd: &Command) -> &mut Self {
        self.line(cmd.multiline())
    }

    /// `NAME=$(command)`.
    pub fn capture(&mut self, name: &str, cmd: &Command) -> &mut Self {
        writeln!(self.buf, "{name}=$({})", cmd.multiline()).ok();
        self
    }

    pub fn capture_inline(&mut self, name: &str, cmd: &Command) -> &mut Self {
        writeln!(self.buf, "{name}=$({})", cmd.inline()).ok();
        self
    }

    /// Single-line command that changes a resource.
    pub fn run_inline(&mut self, cmd: &Command) -> &mut Self {
        self.line(cmd.inline())
    }

    /// Read-only check, kept on one line.
    pub fn verify(&mut self, cmd: &Command) -> &mut Self {
        debug_assert!(cmd.is_read_only(), "verify takes show/list commands, got `{}`", cmd.head);
        self.line(cmd.inline())
    }

    /// `echo "<text>"`; `text` may reference shell variables, so configured
    /// values spliced into it go through [`dq_escape`].
    pub fn echo(&mut self, text: &str) -> &mut Self {
        writeln!(self.buf, "echo \"{text}\"").ok();
        self
    }

    /// Writes `body` to `path` through a quoted heredoc, so nothing in it expands.
    pub fn heredoc(&mut self, path: &str, body: &str) -> &mut Self {
        writeln!(self.buf, "cat > {path} << 'EOF'").ok();
        self.buf.push_str(body);
        if !body.ends_with('\n') {
            self.buf.push('\n');
        }
        self.buf.push_str("EOF\n");
        self
    }

    /// `if [ -z "$NAME" ]; then ... fi` around the lines `fallback` writes.
    pub fn if_empty(&mut self, name: &str, fallback: impl FnOnce(&mut Script)) -> &mut Self {
        writeln!(self.buf, "if [ -z \"${name}\" ]; then").ok();
        let mut inner = Script::default();
        fallback(&mut inner);
        for l in inner.buf.lines() {
            if l.is_empty() {
                self.buf.push('\n');
            } else {
                writeln!(self.buf, "  {l}").ok();
            }
        }
        self.buf.push_str("fi\n");
        self
    }

    /// Closes the block with a blank line and returns its text.
    pub fn finish(&mut self) -> String {
        if !self.buf.ends_with("\n\n") {
            self.buf.push('\n');
        }
        std::mem::take(&mut self.buf)
    }
}

/// Escapes text for XML element content.
pub fn xml_escape(value: &str) -> String {
    value.replace('&', "&amp;").replace('<', "&lt;").replace('>', "&gt;")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dq_escapes_shell_specials() {
        assert_eq!(dq("plain-name"), "\"plain-name\"");
        assert_eq!(dq(r#"a"b$c`d\e"#), r#""a\"b\$c\`d\\e""#);
    }

    #[test]
    fn echo_with_escaped_value_keeps_variables() {
        let mut s = Script::default();
        s.echo(&format!("curl $APIM_URL/{}/alive", dq_escape("a$b\"c")));
        assert_eq!(s.finish(), "echo \"curl $APIM_URL/a\\$b\\\"c/alive\"\n\n");
    }

    #[test]
    fn sq_wraps_json() {
        assert_eq!(sq(r#"["https://a"]"#), r#"'["https://a"]'"#);
        assert_eq!(sq("it's"), r"'it'\''s'");
    }

    #[test]
    fn multiline_uses_continuations() {
        let cmd = Command::az("group create").opt("--name", var("RG_NAME")).opt("--location", var("LOCATION"));
        assert_eq!(cmd.multiline(), "az group create \\\n  --name \"$RG_NAME\" \\\n  --location \"$LOCATION\"");
        assert_eq!(cmd.inline(), "az group create --name \"$RG_NAME\" --location \"$LOCATION\"");
    }

    #[test]
    fn read_only_commands_are_show_or_list() {
        assert!(Command::az("keyvault secret show").opt("--name", "x").is_read_only());
        assert!(Command::az("apim api operation list").is_read_only());
        assert!(!Command::az("keyvault secret set").opt("--value", "show").is_read_only());
        assert!(!Command::az("bot msteams create").is_read_only());
    }

    #[test]
    fn run_inline_keeps_one_line() {
        let mut s = Script::default();
        s.run_inline(&Command::az("keyvault secret set").opt("--name", "a").opt("--value", var("B")));
        assert_eq!(s.finish(), "az keyvault secret set --name a --value \"$B\"\n\n");
    }

    #[test]
    #[should_panic(expected = "verify takes show/list commands")]
    #[cfg(debug_assertions)]
    fn verify_rejects_mutating_commands() {
        Script::default().verify(&Command::az("keyvault secret set"));
    }

    #[test]
    fn if_empty_indents_fallback() {
        let mut s = Script::default();
        s.if_empty("HOST", |f| {
            f.comment("fallback").assign("HOST", "\"x\"");
        });
        assert_eq!(s.finish(), "if [ -z \"$HOST\" ]; then\n  # fallback\n  HOST=\"x\"\nfi\n\n");
    }

    #[test]
    fn heredoc_is_quoted() {
        let mut s = Script::default();
        s.heredoc("/tmp/x.json", "{}");
        assert_eq!(s.finish(), "cat > /tmp/x.json << 'EOF'\n{}\nEOF\n\n");
    }
}
