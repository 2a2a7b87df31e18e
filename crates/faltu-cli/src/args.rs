//! Hand-rolled argument parsing. Every `--flag` takes exactly one value.

#[derive(Debug, Clone, Default)]
pub struct Args {
    raw: Vec<String>,
}

impl Args {
    pub fn from_env() -> Self {
        Self::new(std::env::args().skip(1).collect())
    }

    pub fn new(raw: Vec<String>) -> Self {
        Self { raw }
    }

    pub fn command(&self) -> Option<&str> {
        self.raw.first().map(String::as_str)
    }

    /// Value following `flag`, e.g. `--symbol NVDA`
    pub fn flag(&self, flag: &str) -> Option<&str> {
        self.rest()
            .iter()
            .position(|a| a == flag)
            .and_then(|i| self.rest().get(i + 1))
            .map(String::as_str)
    }

    /// Arguments after the command that are neither flags nor flag values
    pub fn positional(&self) -> Vec<&str> {
        let mut out = Vec::new();
        let mut skip_next = false;
        for arg in self.rest() {
            if skip_next {
                skip_next = false;
            } else if arg.starts_with("--") {
                skip_next = true;
            } else {
                out.push(arg.as_str());
            }
        }
        out
    }

    /// The first positional argument, or an error naming what is missing.
    pub fn required(&self, what: &str) -> anyhow::Result<&str> {
        self.positional()
            .first()
            .copied()
            .ok_or_else(|| anyhow::anyhow!("Missing <{}> (try `faltu help`)", what))
    }

    fn rest(&self) -> &[String] {
        self.raw.get(1..).unwrap_or(&[])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(line: &str) -> Args {
        Args::new(line.split_whitespace().map(str::to_string).collect())
    }

    #[test]
    fn test_command_and_positional() {
        let a = args("analyze Is NVDA overvalued? --symbol NVDA --name Nvidia");
        assert_eq!(a.command(), Some("analyze"));
        assert_eq!(a.positional(), vec!["Is", "NVDA", "overvalued?"]);
        assert_eq!(a.flag("--symbol"), Some("NVDA"));
        assert_eq!(a.flag("--name"), Some("Nvidia"));
        assert_eq!(a.flag("--style"), None);
    }

    #[test]
    fn test_flag_without_value() {
        let a = args("history --limit");
        assert_eq!(a.flag("--limit"), None);
        assert!(a.positional().is_empty());
    }

    #[test]
    fn test_required() {
        assert_eq!(args("report 42").required("id").unwrap(), "42");
        let err = args("report").required("id").unwrap_err();
        assert!(err.to_string().contains("<id>"));
    }

    #[test]
    fn test_empty() {
        let a = Args::default();
        assert_eq!(a.command(), None);
        assert!(a.positional().is_empty());
    }
}
