use crate::config::{FOREGROUND_BUILTIN, NEW_SESSION_BUILTIN};

/// The one structure a line is executed as.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineKind {
    Empty,
    NewSession,
    Foreground,
    Concatenation,
    Pipeline,
    Redirection,
    Conditional,
    Sequential,
    Background,
    Plain,
}

/// Operator families found by one scan of a line.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Markers {
    pub concat: bool,
    pub pipe: bool,
    pub redirect: bool,
    pub conditional: bool,
    pub sequential: bool,
    pub background: bool,
}

/// Highest first. Only the first structure present is honored; operator
/// characters of lower-ranked structures are passed through as argument text.
pub const PRECEDENCE: [LineKind; 6] = [
    LineKind::Concatenation,
    LineKind::Pipeline,
    LineKind::Redirection,
    LineKind::Conditional,
    LineKind::Sequential,
    LineKind::Background,
];

impl Markers {
    pub fn has(&self, kind: LineKind) -> bool {
        match kind {
            LineKind::Concatenation => self.concat,
            LineKind::Pipeline => self.pipe,
            LineKind::Redirection => self.redirect,
            LineKind::Conditional => self.conditional,
            LineKind::Sequential => self.sequential,
            LineKind::Background => self.background,
            LineKind::Empty | LineKind::NewSession | LineKind::Foreground | LineKind::Plain => false,
        }
    }
}

/// `|` and `&` count as pipe / background only when neither neighbour is the
/// same character; doubled they mark a conditional chain.
pub fn scan(line: &str) -> Markers {
    let b = line.as_bytes();
    let doubled = |i: usize| (i > 0 && b[i - 1] == b[i]) || b.get(i + 1) == Some(&b[i]);
    let mut m = Markers::default();
    for (i, &c) in b.iter().enumerate() {
        match c {
            b'|' | b'&' if doubled(i) => m.conditional = true,
            b'|' => m.pipe = true,
            b'&' => m.background = true,
            b'#' => m.concat = true,
            b'<' | b'>' => m.redirect = true,
            b';' => m.sequential = true,
            _ => {}
        }
    }
    m
}

/// Builtins match the whole trimmed line and beat every operator.
pub fn classify(line: &str) -> LineKind {
    match line.trim() {
        "" => LineKind::Empty,
        NEW_SESSION_BUILTIN => LineKind::NewSession,
        FOREGROUND_BUILTIN => LineKind::Foreground,
        _ => {
            let m = scan(line);
            PRECEDENCE.iter().copied().find(|&k| m.has(k)).unwrap_or(LineKind::Plain)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use super::LineKind::*;

    #[test]
    fn single_structures() {
        assert_eq!(classify("ls -l"), Plain);
        assert_eq!(classify("a.txt # b.txt"), Concatenation);
        assert_eq!(classify("ls | wc"), Pipeline);
        assert_eq!(classify("sort < in"), Redirection);
        assert_eq!(classify("ls >> out"), Redirection);
        assert_eq!(classify("true && ls"), Conditional);
        assert_eq!(classify("false || ls"), Conditional);
        assert_eq!(classify("ls ; pwd"), Sequential);
        assert_eq!(classify("sleep 5 &"), Background);
        assert_eq!(classify("   "), Empty);
    }

    #[test]
    fn builtins_need_the_whole_line() {
        assert_eq!(classify("  newt "), NewSession);
        assert_eq!(classify("fg"), Foreground);
        assert_eq!(classify("fg 1"), Plain);
        assert_eq!(classify("echo newt"), Plain);
    }

    #[test]
    fn doubled_characters_are_conditional_not_pipe_or_background() {
        let m = scan("a || b && c");
        assert!(m.conditional && !m.pipe && !m.background);
        let m = scan("||a");
        assert!(m.conditional && !m.pipe);
    }

    #[test]
    fn precedence_ranking() {
        assert_eq!(classify("a # b | c"), Concatenation);
        assert_eq!(classify("ls | wc > out"), Pipeline);
        assert_eq!(classify("ls > out && pwd"), Redirection);
        assert_eq!(classify("true && ls ; pwd"), Conditional);
        assert_eq!(classify("ls ; sleep 1 &"), Sequential);
        assert_eq!(classify("ls || x | y"), Pipeline);
    }

    #[test]
    fn ranking_table_order() {
        assert_eq!(PRECEDENCE, [Concatenation, Pipeline, Redirection, Conditional, Sequential, Background]);
    }
}
