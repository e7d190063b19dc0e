//! KaTeX command completions, laid out after the KaTeX support table.
//!
//! Table suffixes give the number of brace arguments the command takes:
//! `\cmd` (0), `\cmd{$1}` (1), `\cmd{$1}{$2}` (2).

use std::collections::HashSet;

use once_cell::sync::Lazy;

use super::{CompletionItem, CompletionKind, InsertText};

const ACCENTS1: &[&str] = &[
    "tilde", "mathring", "widetilde", "overgroup", "utilde", "undergroup", "acute", "vec",
    "Overrightarrow", "bar", "overleftarrow", "overrightarrow", "breve", "underleftarrow",
    "underrightarrow", "check", "overleftharpoon", "overrightharpoon", "dot",
    "overleftrightarrow", "overbrace", "ddot", "underleftrightarrow", "underbrace", "grave",
    "overline", "overlinesegment", "hat", "underline", "underlinesegment", "widehat",
    "widecheck",
];

const DELIMITERS0: &[&str] = &[
    "lparen", "rparen", "lceil", "rceil", "uparrow", "lbrack", "rbrack", "lfloor", "rfloor",
    "downarrow", "updownarrow", "langle", "rangle", "lgroup", "rgroup", "Uparrow", "vert",
    "ulcorner", "urcorner", "Downarrow", "Vert", "llcorner", "lrcorner", "Updownarrow",
    "lvert", "rvert", "lVert", "rVert", "backslash", "lang", "rang", "lt", "gt",
];

const DELIMITER_SIZING0: &[&str] = &[
    "left", "big", "bigl", "bigm", "bigr", "middle", "Big", "Bigl", "Bigm", "Bigr", "right",
    "bigg", "biggl", "biggm", "biggr", "Bigg", "Biggl", "Biggm", "Biggr",
];

const GREEK_LETTERS0: &[&str] = &[
    "Alpha", "Beta", "Gamma", "Delta", "Epsilon", "Zeta", "Eta", "Theta", "Iota", "Kappa",
    "Lambda", "Mu", "Nu", "Xi", "Omicron", "Pi", "Sigma", "Tau", "Upsilon", "Phi", "Chi",
    "Psi", "Omega", "varGamma", "varDelta", "varTheta", "varLambda", "varXi", "varPi",
    "varSigma", "varUpsilon", "varPhi", "varPsi", "varOmega", "alpha", "beta", "gamma",
    "delta", "epsilon", "zeta", "eta", "theta", "iota", "kappa", "lambda", "mu", "nu", "xi",
    "omicron", "pi", "rho", "sigma", "tau", "upsilon", "phi", "chi", "psi", "omega",
    "varepsilon", "varkappa", "vartheta", "thetasym", "varpi", "varrho", "varsigma", "varphi",
    "digamma",
];

const OTHER_LETTERS0: &[&str] = &[
    "imath", "nabla", "Im", "Reals", "jmath", "partial", "image", "wp", "aleph", "Game",
    "Bbbk", "weierp", "alef", "Finv", "N", "Z", "alefsym", "cnums", "natnums", "beth",
    "Complex", "R", "gimel", "ell", "Re", "daleth", "hbar", "real", "eth", "hslash", "reals",
];

const ANNOTATION1: &[&str] = &[
    "cancel", "overbrace", "bcancel", "underbrace", "xcancel", "not =", "sout", "boxed", "tag",
    "tag*",
];

const VERTICAL_LAYOUT0: &[&str] = &[
    "atop",
];

const VERTICAL_LAYOUT2: &[&str] = &[
    "stackrel", "overset", "underset", "raisebox",
];

const OVERLAP1: &[&str] = &[
    "mathllap", "mathrlap", "mathclap", "llap", "rlap", "clap", "smash",
];

const SPACING0: &[&str] = &[
    "thinspace", "medspace", "thickspace", "enspace", "quad", "qquad", "negthinspace",
    "negmedspace", "nobreakspace", "negthickspace",
];

const SPACING1: &[&str] = &[
    "kern", "mkern", "mskip", "hskip", "hspace", "hspace*", "phantom", "hphantom", "vphantom",
];

const LOGIC_AND_SET_THEORY0: &[&str] = &[
    "forall", "complement", "therefore", "emptyset", "exists", "subset", "because", "empty",
    "exist", "supset", "mapsto", "varnothing", "nexists", "mid", "to", "implies", "in", "land",
    "gets", "impliedby", "isin", "lor", "leftrightarrow", "iff", "notin", "ni", "notni", "neg",
    "lnot",
];

const BIG_OPERATORS0: &[&str] = &[
    "sum", "prod", "bigotimes", "bigvee", "int", "coprod", "bigoplus", "bigwedge", "iint",
    "intop", "bigodot", "bigcap", "iiint", "smallint", "biguplus", "bigcup", "oint", "oiint",
    "oiiint", "bigsqcup",
];

const BINARY_OPERATORS0: &[&str] = &[
    "cdot", "gtrdot", "pmod", "cdotp", "intercal", "pod", "centerdot", "land", "rhd", "circ",
    "leftthreetimes", "rightthreetimes", "amalg", "circledast", "ldotp", "rtimes", "And",
    "circledcirc", "lor", "setminus", "ast", "circleddash", "lessdot", "smallsetminus",
    "barwedge", "Cup", "lhd", "sqcap", "bigcirc", "cup", "ltimes", "sqcup", "bmod", "curlyvee",
    "times", "boxdot", "curlywedge", "mp", "unlhd", "boxminus", "div", "odot", "unrhd",
    "boxplus", "divideontimes", "ominus", "uplus", "boxtimes", "dotplus", "oplus", "vee",
    "bullet", "doublebarwedge", "otimes", "veebar", "Cap", "doublecap", "oslash", "wedge",
    "cap", "doublecup", "pm", "plusmn", "wr",
];

const FRACTIONS0: &[&str] = &[
    "over", "above",
];

const FRACTIONS2: &[&str] = &[
    "frac", "dfrac", "tfrac", "cfrac", "genfrac",
];

const BINOMIAL_COEFFICIENTS0: &[&str] = &[
    "choose",
];

const BINOMIAL_COEFFICIENTS2: &[&str] = &[
    "binom", "dbinom", "tbinom", "brace", "brack",
];

const MATH_OPERATORS0: &[&str] = &[
    "arcsin", "cotg", "ln", "det", "arccos", "coth", "log", "gcd", "arctan", "csc", "sec",
    "inf", "arctg", "ctg", "sin", "lim", "arcctg", "cth", "sinh", "liminf", "arg", "deg", "sh",
    "limsup", "ch", "dim", "tan", "max", "cos", "exp", "tanh", "min", "cosec", "hom", "tg",
    "Pr", "cosh", "ker", "th", "sup", "cot", "lg", "argmax", "argmin", "limits",
];

const MATH_OPERATORS1: &[&str] = &[
    "operatorname",
];

const SQRT1: &[&str] = &[
    "sqrt",
];

const RELATIONS0: &[&str] = &[
    "eqcirc", "lesseqgtr", "sqsupset", "eqcolon", "lesseqqgtr", "sqsupseteq", "Eqcolon",
    "lessgtr", "Subset", "eqqcolon", "lesssim", "subset", "approx", "Eqqcolon", "ll",
    "subseteq", "sube", "approxeq", "eqsim", "lll", "subseteqq", "asymp", "eqslantgtr",
    "llless", "succ", "backepsilon", "eqslantless", "lt", "succapprox", "backsim", "equiv",
    "mid", "succcurlyeq", "backsimeq", "fallingdotseq", "models", "succeq", "between", "frown",
    "multimap", "succsim", "bowtie", "ge", "owns", "Supset", "bumpeq", "geq", "parallel",
    "supset", "Bumpeq", "geqq", "perp", "supseteq", "circeq", "geqslant", "pitchfork",
    "supseteqq", "colonapprox", "gg", "prec", "thickapprox", "Colonapprox", "ggg",
    "precapprox", "thicksim", "coloneq", "gggtr", "preccurlyeq", "trianglelefteq", "Coloneq",
    "gt", "preceq", "triangleq", "coloneqq", "gtrapprox", "precsim", "trianglerighteq",
    "Coloneqq", "gtreqless", "propto", "varpropto", "colonsim", "gtreqqless", "risingdotseq",
    "vartriangle", "Colonsim", "gtrless", "shortmid", "vartriangleleft", "cong", "gtrsim",
    "shortparallel", "vartriangleright", "curlyeqprec", "in", "sim", "vcentcolon",
    "curlyeqsucc", "Join", "simeq", "vdash", "dashv", "le", "smallfrown", "vDash", "dblcolon",
    "leq", "smallsmile", "Vdash", "doteq", "leqq", "smile", "Vvdash", "Doteq", "leqslant",
    "sqsubset", "doteqdot", "lessapprox", "sqsubseteq",
];

const NEGATED_RELATIONS0: &[&str] = &[
    "gnapprox", "ngeqslant", "nsubseteq", "precneqq", "gneq", "ngtr", "nsubseteqq", "precnsim",
    "gneqq", "nleq", "nsucc", "subsetneq", "gnsim", "nleqq", "nsucceq", "subsetneqq",
    "gvertneqq", "nleqslant", "nsupseteq", "succnapprox", "lnapprox", "nless", "nsupseteqq",
    "succneqq", "lneq", "nmid", "ntriangleleft", "succnsim", "lneqq", "notin",
    "ntrianglelefteq", "supsetneq", "lnsim", "notni", "ntriangleright", "supsetneqq",
    "lvertneqq", "nparallel", "ntrianglerighteq", "varsubsetneq", "ncong", "nprec", "nvdash",
    "varsubsetneqq", "ne", "npreceq", "nvDash", "varsupsetneq", "neq", "nshortmid", "nVDash",
    "varsupsetneqq", "ngeq", "nshortparallel", "nVdash", "ngeqq", "nsim", "precnapprox",
];

const ARROWS0: &[&str] = &[
    "circlearrowleft", "leftharpoonup", "rArr", "circlearrowright", "leftleftarrows", "rarr",
    "curvearrowleft", "leftrightarrow", "restriction", "curvearrowright", "Leftrightarrow",
    "rightarrow", "Darr", "leftrightarrows", "Rightarrow", "dArr", "leftrightharpoons",
    "rightarrowtail", "darr", "leftrightsquigarrow", "rightharpoondown", "dashleftarrow",
    "Lleftarrow", "rightharpoonup", "dashrightarrow", "longleftarrow", "rightleftarrows",
    "downarrow", "Longleftarrow", "rightleftharpoons", "Downarrow", "longleftrightarrow",
    "rightrightarrows", "downdownarrows", "Longleftrightarrow", "rightsquigarrow",
    "downharpoonleft", "longmapsto", "Rrightarrow", "downharpoonright", "longrightarrow",
    "Rsh", "gets", "Longrightarrow", "searrow", "Harr", "looparrowleft", "swarrow", "hArr",
    "looparrowright", "to", "harr", "Lrarr", "twoheadleftarrow", "hookleftarrow", "lrArr",
    "twoheadrightarrow", "hookrightarrow", "lrarr", "Uarr", "iff", "Lsh", "uArr", "impliedby",
    "mapsto", "uarr", "implies", "nearrow", "uparrow", "Larr", "nleftarrow", "Uparrow", "lArr",
    "nLeftarrow", "updownarrow", "larr", "nleftrightarrow", "Updownarrow", "leadsto",
    "nLeftrightarrow", "upharpoonleft", "leftarrow", "nrightarrow", "upharpoonright",
    "Leftarrow", "nRightarrow", "upuparrows", "leftarrowtail", "nwarrow", "leftharpoondown",
    "Rarr",
];

const EXTENSIBLE_ARROWS1: &[&str] = &[
    "xleftarrow", "xrightarrow", "xLeftarrow", "xRightarrow", "xleftrightarrow",
    "xLeftrightarrow", "xhookleftarrow", "xhookrightarrow", "xtwoheadleftarrow",
    "xtwoheadrightarrow", "xleftharpoonup", "xrightharpoonup", "xleftharpoondown",
    "xrightharpoondown", "xleftrightharpoons", "xrightleftharpoons", "xtofrom", "xmapsto",
    "xlongequal",
];

const CLASS_ASSIGNMENT0: &[&str] = &[
    "mathbin", "mathclose", "mathinner", "mathop", "mathopen", "mathord", "mathpunct",
    "mathrel",
];

const COLOR2: &[&str] = &[
    "color", "textcolor", "colorbox",
];

const FONT0: &[&str] = &[
    "rm", "bf", "it", "sf", "tt",
];

const FONT1: &[&str] = &[
    "mathrm", "mathbf", "mathit", "mathnormal", "textbf", "textit", "textrm", "bold", "Bbb",
    "textnormal", "boldsymbol", "mathbb", "text", "bm", "frak", "mathsf", "mathtt", "mathfrak",
    "textsf", "texttt", "mathcal", "mathscr",
];

const SIZE0: &[&str] = &[
    "Huge", "huge", "LARGE", "Large", "large", "normalsize", "small", "footnotesize",
    "scriptsize", "tiny",
];

const STYLE0: &[&str] = &[
    "displaystyle", "textstyle", "scriptstyle", "scriptscriptstyle", "limits", "nolimits",
    "verb",
];

const SYMBOLS_AND_PUNCTUATION0: &[&str] = &[
    "cdots", "LaTeX", "ddots", "TeX", "ldots", "nabla", "vdots", "infty", "dotsb", "infin",
    "dotsc", "checkmark", "dotsi", "dag", "dotsm", "dagger", "dotso", "sdot", "ddag",
    "mathellipsis", "ddagger", "Box", "Dagger", "lq", "square", "angle", "blacksquare",
    "measuredangle", "rq", "triangle", "sphericalangle", "triangledown", "top", "triangleleft",
    "bot", "triangleright", "colon", "bigtriangledown", "backprime", "bigtriangleup", "pounds",
    "prime", "blacktriangle", "mathsterling", "blacktriangledown", "blacktriangleleft", "yen",
    "blacktriangleright", "surd", "diamond", "degree", "Diamond", "lozenge", "mho",
    "blacklozenge", "diagdown", "star", "diagup", "bigstar", "flat", "clubsuit", "natural",
    "copyright", "clubs", "sharp", "circledR", "diamondsuit", "heartsuit", "diamonds",
    "hearts", "circledS", "spadesuit", "spades", "maltese",
];

const NO_ARG_GROUPS: &[&[&str]] = &[
    DELIMITERS0,
    DELIMITER_SIZING0,
    GREEK_LETTERS0,
    OTHER_LETTERS0,
    SPACING0,
    VERTICAL_LAYOUT0,
    LOGIC_AND_SET_THEORY0,
    BIG_OPERATORS0,
    BINARY_OPERATORS0,
    BINOMIAL_COEFFICIENTS0,
    FRACTIONS0,
    MATH_OPERATORS0,
    RELATIONS0,
    NEGATED_RELATIONS0,
    ARROWS0,
    FONT0,
    SIZE0,
    STYLE0,
    SYMBOLS_AND_PUNCTUATION0,
];

// Class assignment commands take an argument despite their table name
const ONE_ARG_GROUPS: &[&[&str]] = &[
    ACCENTS1,
    ANNOTATION1,
    OVERLAP1,
    SPACING1,
    MATH_OPERATORS1,
    SQRT1,
    EXTENSIBLE_ARROWS1,
    FONT1,
    CLASS_ASSIGNMENT0,
];

const TWO_ARG_GROUPS: &[&[&str]] = &[
    VERTICAL_LAYOUT2,
    BINOMIAL_COEFFICIENTS2,
    FRACTIONS2,
    COLOR2,
];

const ENV_SNIPPET: &str = "begin{${1|aligned,alignedat,array,bmatrix,Bmatrix,cases,darray,dcases,gathered,matrix,pmatrix,vmatrix,Vmatrix|}}\n\t$2\n\\end{$1}";

static MATH_COMPLETIONS: Lazy<Vec<CompletionItem>> = Lazy::new(build_math_completions);

/// Every math completion with its sort key. Built once.
pub fn math_completions() -> &'static [CompletionItem] {
    &MATH_COMPLETIONS
}

/// Commands of all `groups`, first occurrence wins.
fn unique(groups: &[&[&'static str]]) -> Vec<&'static str> {
    let mut seen = HashSet::new();
    groups
        .iter()
        .flat_map(|group| group.iter().copied())
        .filter(|cmd| seen.insert(*cmd))
        .collect()
}

/// Lowercase letters sort before uppercase ones: `c` -> `0c`, `C` -> `1c`.
fn sort_key(label: &str) -> String {
    let mut key = String::with_capacity(label.len() * 2);
    for c in label.chars() {
        if c.is_ascii_lowercase() {
            key.push('0');
            key.push(c);
        } else if c.is_ascii_uppercase() {
            key.push('1');
            key.push(c.to_ascii_lowercase());
        } else {
            key.push(c);
        }
    }
    key
}

fn command(cmd: &str, insert_text: InsertText) -> CompletionItem {
    CompletionItem::new(format!("\\{cmd}"), CompletionKind::Function).with_insert_text(insert_text)
}

fn build_math_completions() -> Vec<CompletionItem> {
    let no_args = unique(NO_ARG_GROUPS)
        .into_iter()
        .map(|cmd| command(cmd, InsertText::Plain(cmd.to_string())));
    let one_arg = unique(ONE_ARG_GROUPS)
        .into_iter()
        .map(|cmd| command(cmd, InsertText::Snippet(format!("{cmd}{{$1}}"))));
    let two_args = unique(TWO_ARG_GROUPS)
        .into_iter()
        .map(|cmd| command(cmd, InsertText::Snippet(format!("{cmd}{{$1}}{{$2}}"))));
    let env = CompletionItem::new("\\begin", CompletionKind::Snippet)
        .with_insert_text(InsertText::Snippet(ENV_SNIPPET.to_string()));

    no_args
        .chain(one_arg)
        .chain(two_args)
        .chain(std::iter::once(env))
        .map(|mut item| {
            item.sort_text = Some(sort_key(&item.label));
            item
        })
        .collect()
}
