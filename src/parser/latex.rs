use crate::config::SpellCheckConfig;
use crate::parser::SkipRange;
use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    // \commandname, optionally starred. Brace arguments of citation and
    // reference commands are flagged by their own patterns below.
    static ref COMMAND: Regex = Regex::new(r"\\[a-zA-Z]+\*?").unwrap();

    // $...$ and $$...$$. The two patterns overlap on display math; the
    // merge pass collapses them into one range.
    static ref INLINE_MATH: Regex = Regex::new(r"\$[^$]*\$").unwrap();
    static ref DISPLAY_MATH: Regex = Regex::new(r"(?s)\$\$.*?\$\$").unwrap();

    // Named math environments, starred or not.
    static ref MATH_ENV: Regex = Regex::new(
        r"(?s)\\begin\{(?:equation|align|gather|multline|displaymath)\*?\}.*?\\end\{(?:equation|align|gather|multline|displaymath)\*?\}",
    )
    .unwrap();

    // \cite, \citep, \citet with any number of bracket notes (natbib allows
    // two) and the brace argument.
    static ref CITATION: Regex = Regex::new(r"\\cite[pt]?\*?(?:\[[^\]]*\])*\{[^}]*\}").unwrap();

    // \ref, \eqref, \label with their brace argument.
    static ref REFERENCE: Regex = Regex::new(r"\\(?:ref|eqref|label)\{[^}]*\}").unwrap();

    // Verbatim-style environments treated as code blocks.
    static ref CODE_ENV: Regex = Regex::new(
        r"(?s)\\begin\{(?:verbatim|lstlisting)\*?\}.*?\\end\{(?:verbatim|lstlisting)\*?\}",
    )
    .unwrap();
}

fn collect_matches(re: &Regex, text: &str, out: &mut Vec<SkipRange>) {
    for m in re.find_iter(text) {
        out.push(SkipRange::new(m.start(), m.end()));
    }
}

/// Run every enabled skip category over the whole text and collect the raw,
/// possibly overlapping match ranges. Callers merge the result.
pub fn collect_skip_ranges(text: &str, config: &SpellCheckConfig) -> Vec<SkipRange> {
    let mut ranges = Vec::new();

    if config.skip_latex_commands {
        collect_matches(&COMMAND, text, &mut ranges);
        collect_matches(&CITATION, text, &mut ranges);
        collect_matches(&REFERENCE, text, &mut ranges);
    }

    if config.skip_math_mode {
        collect_matches(&DISPLAY_MATH, text, &mut ranges);
        collect_matches(&INLINE_MATH, text, &mut ranges);
        collect_matches(&MATH_ENV, text, &mut ranges);
    }

    if config.skip_code_blocks {
        collect_matches(&CODE_ENV, text, &mut ranges);
    }

    ranges
}
