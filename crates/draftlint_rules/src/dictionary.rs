//! Built-in rule tables.
//!
//! The trigger lists come from the RFC Editor's editorial tooling and are
//! deliberately literal: no stemming, no fuzzy matching. Each function
//! builds one [`Rule`]; [`builtin_rules`] assembles the full set in the
//! order checks are run.

use crate::{AbbreviationPair, ArticleExceptions, CheckKind, Pattern, Rule, Severity};

fn terms(entries: &[(&[&str], &str)]) -> Vec<Pattern> {
    let mut patterns = Vec::new();
    for (triggers, suggestion) in entries {
        for trigger in *triggers {
            patterns.push(Pattern::new(*trigger).with_suggestion(*suggestion));
        }
    }
    patterns
}

/// Common typos and malformed phrases.
pub fn typos_rule() -> Rule {
    let mut patterns = terms(&[
        (&["though"], "through"),
        (&["mange", "manger"], "manage/manager"),
        (&["indicted", "indicting"], "indicated/indicating"),
        (&["sate", "sates"], "state(s)"),
        (&["massage"], "message"),
        (&["polices"], "policies"),
        (&["steam"], "stream"),
        (&["thee"], "three"),
        (&["handed", "handing"], "handled/handling"),
        (&["pubic"], "public"),
        (&["widow"], "window"),
        (&["fist"], "first"),
        (&["sever", "severs"], "server(s)"),
        (&["singe", "singes"], "single(s)"),
        (&["singed", "singing"], "signed/signing"),
        (&["covey"], "convey"),
        (&["more that", "more then"], "more than"),
        (&["greater that", "greater then"], "greater than"),
        (&["less that", "less then"], "less than"),
        (&["fewer that", "fewer then"], "fewer than"),
        (&["different that", "different then"], "different than"),
        (&["rather that", "rather then"], "rather than"),
        (&["other that", "other then"], "other than"),
        (&["lager"], "larger"),
        (&["roaster"], "roster"),
        (&["according the"], "according to the"),
        (&["specified section"], "specified in Section"),
        (&["provided section"], "provided in Section"),
        (&["described section"], "described in Section"),
        (&["discussed section"], "discussed in Section"),
        (&["detailed section"], "detailed in Section"),
        (&["listed section"], "listed in Section"),
        (&["defined section"], "defined in Section"),
        (&["presented section"], "presented in Section"),
        (&["specified this"], "specified in this"),
        (&["exiting"], "existing"),
        (&["complaint"], "compliant"),
        (&["mime media type"], "media type"),
        (&["some the"], "some of the"),
        (&["have be"], "have been"),
        (&["has be"], "has been"),
        (&["number authority"], "Numbers Authority"),
        (
            &["international telecommunications union"],
            "International Telecommunication Union",
        ),
        (&["any the"], "any of the"),
        (&["the of"], "the"),
        (&["described rfc"], "described in RFC"),
        (&["may chose"], "may choose"),
        (&["to chose"], "to choose"),
        (&["needs be"], "needs to be"),
        (&["theses"], "these"),
        (&["boarder"], "border"),
        (&["raging"], "ranging"),
        (&["sub-series"], "subseries"),
    ]);
    patterns.push(Pattern::new("IPV4").with_suggestion("IPv4").case_sensitive());
    patterns.push(Pattern::new("IPV6").with_suggestion("IPv6").case_sensitive());
    patterns.push(
        Pattern::new("Designated Expert")
            .with_suggestion("designated expert")
            .case_sensitive(),
    );
    Rule::new(
        "typos",
        Severity::Warning,
        CheckKind::Terms {
            patterns,
            message: "Possible typo: {term}. Did you mean \"{suggestion}\"?".into(),
        },
    )
}

/// Non-inclusive terminology with preferred alternatives.
pub fn inclusive_language_rule() -> Rule {
    let patterns = terms(&[
        (&["whitelist"], "allowlist or passlist"),
        (&["blacklist"], "denylist or blocklist"),
        (&["master"], "primary, main, host, leader or orchestrator"),
        (&["slave"], "secondary, replica, target, follower or worker"),
        (&["native"], "built-in"),
        (&["grandfather"], "exemption or approve"),
        (&["he/she", "he or she"], "they"),
        (&["cripple", "handicap"], "impair or impeded"),
    ]);
    Rule::new(
        "inclusiveLanguage",
        Severity::Warning,
        CheckKind::Terms {
            patterns,
            message: "Inclusive Language: Consider using {suggestion} instead of \"{term}\"."
                .into(),
        },
    )
}

/// Editorial placeholders that must not survive into a published draft.
pub fn placeholders_rule() -> Rule {
    let patterns = [
        "TBD", "TBA", "XX", "YY", "NN", "MM", "0000", "TODO",
        // RFC-number placeholders appear glued to the series name.
        "RFCXX", "RFCYY", "RFCNN", "RFCMM", "RFC0000",
    ]
    .iter()
    .map(|t| Pattern::new(*t))
    .collect();
    Rule::new(
        "placeholders",
        Severity::Warning,
        CheckKind::Terms {
            patterns,
            message: "Common placeholder term \"{term}\" detected.".into(),
        },
    )
    .ignore_regions()
}

/// RFC-process vocabulary that is easy to misuse in a draft.
pub fn rfc_terms_rule() -> Rule {
    let patterns = [
        "RFC series",
        "IETF stream",
        "IAB stream",
        "IRTF stream",
        "independent stream",
        "IETF-stream",
        "IAB-stream",
        "IRTF-stream",
        "internet draft",
        "last call",
        "chair",
        "director",
        "IETF member",
        "IAB member",
        "IETF engineer",
        "earlier version",
        "previous version",
        "future version",
        "IETF RFC",
        "IAB RFC",
        "IRTF RFC",
        "standards track",
        "standards-track",
        "experimental",
        "informational",
        "best current practice",
        "historic",
        "proposed standard",
        "draft standard",
        "internet standard",
        "full standard",
        "working group",
        "area director",
        "shepherd",
    ]
    .iter()
    .map(|t| Pattern::new(*t))
    .collect();
    Rule::new(
        "rfcTerms",
        Severity::Info,
        CheckKind::Terms {
            patterns,
            message: "\"{term}\" is a potential RFC-specific term. Ensure proper usage.".into(),
        },
    )
}

pub fn repeated_words_rule() -> Rule {
    Rule::new("repeatedWords", Severity::Warning, CheckKind::RepeatedWords)
}

pub fn non_ascii_rule() -> Rule {
    Rule::new("nonAscii", Severity::Warning, CheckKind::NonAscii).ignore_regions()
}

/// Indefinite-article check with the pronunciation exception lists.
pub fn articles_rule() -> Rule {
    let to_vec = |items: &[&str]| items.iter().map(|s| s.to_string()).collect();
    let exceptions = ArticleExceptions {
        a_prev_ok: to_vec(&["appendix", "connection", "link", "node", "operator"]),
        a_vowel_ok: to_vec(&[
            "one",
            "once",
            "europ",
            "ubiquitous",
            "unicast",
            "unicode",
            "unidir",
            "unif",
            "union",
            "uniqu",
            "unit",
            "univers",
            "usab",
            "usag",
            "use",
            "user",
            "utilit",
            "ucdn",
            "u-label",
            "and",
        ]),
        a_r_acronym_ok: to_vec(&[
            "radius",
            "receive",
            "recommended",
            "refer",
            "reload",
            "rst",
            "realm",
            "reservation",
            "request",
            "reset",
            "route",
            "rpl",
        ]),
        an_consonant_ok: to_vec(&["hour", "honest", "honor", "mtrace", "x-coordinate", "xtr"]),
        an_bad_acronyms: to_vec(&[
            "aaa", "fec", "fir", "lis", "lrdd", "meg", "mep", "mrhof", "mic", "naptr", "nat",
            "nas", "ras", "rohc", "rpl", "rst", "safi", "scsi", "sid", "sip", "smpte", "syn",
            "lf", "rinit",
        ]),
    };
    Rule::new(
        "articles",
        Severity::Warning,
        CheckKind::Articles { exceptions },
    )
}

pub fn hyphenation_rule() -> Rule {
    Rule::new("hyphenation", Severity::Warning, CheckKind::Hyphenation)
}

/// Abbreviations that must be expanded on first use.
pub fn abbreviations_rule() -> Rule {
    let pairs = [
        ("TCP", "Transmission Control Protocol"),
        ("UDP", "User Datagram Protocol"),
        ("TLS", "Transport Layer Security"),
        ("DTLS", "Datagram Transport Layer Security"),
        ("HTTP", "Hypertext Transfer Protocol"),
        ("DNS", "Domain Name System"),
        ("DHCP", "Dynamic Host Configuration Protocol"),
        ("NAT", "Network Address Translation"),
        ("MTU", "Maximum Transmission Unit"),
        ("PDU", "Protocol Data Unit"),
        ("BGP", "Border Gateway Protocol"),
        ("MPLS", "Multiprotocol Label Switching"),
        ("ECN", "Explicit Congestion Notification"),
        ("AEAD", "Authenticated Encryption with Associated Data"),
        ("CBOR", "Concise Binary Object Representation"),
        ("OAM", "Operations, Administration, and Maintenance"),
        ("SCTP", "Stream Control Transmission Protocol"),
    ]
    .iter()
    .map(|(s, e)| AbbreviationPair::new(*s, *e))
    .collect();
    Rule::new(
        "abbreviations",
        Severity::Info,
        CheckKind::Abbreviations { pairs },
    )
}

/// The full built-in rule set, in execution order.
pub fn builtin_rules() -> Vec<Rule> {
    vec![
        articles_rule(),
        hyphenation_rule(),
        inclusive_language_rule(),
        non_ascii_rule(),
        placeholders_rule(),
        rfc_terms_rule(),
        repeated_words_rule(),
        typos_rule(),
        abbreviations_rule(),
    ]
}
