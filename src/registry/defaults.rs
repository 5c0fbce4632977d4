//! Built-in registry tables.
//!
//! Aliases and detection patterns are maintained separately and keyed by the
//! same canonical ids. Entry order matters: it is the tie-break order of every
//! cascade stage, so narrower SKUs (`A100_80GB`, `RTX_A2000_12GB`) precede the
//! broader patterns that would also match them.

/// Canonical ids and their aliases, in registry order.
pub const DEFAULT_ALIASES: &[(&str, &[&str])] = &[
    ("H100", &["h100", "h100 sxm", "h100 pcie", "h100 80gb"]),
    ("A100_80GB", &["a100 80gb", "a100 sxm4 80gb", "a100 pcie 80gb"]),
    ("A100_40GB", &["a100", "a100 40gb", "a100 pcie 40gb"]),
    ("L40S", &["l40s", "l40s 48gb"]),
    ("L4", &["l4", "l4 24gb"]),
    ("A10", &["a10", "a10 24gb"]),
    ("A2", &["a2", "a2 16gb"]),
    ("RTX_A6000", &["rtx a6000", "a6000", "quadro rtx a6000"]),
    ("RTX_A5000", &["rtx a5000", "a5000"]),
    ("RTX_A4000", &["rtx a4000", "a4000"]),
    ("RTX_A2000_12GB", &["rtx a2000 12gb", "a2000 12gb"]),
    ("RTX_A2000", &["rtx a2000", "a2000", "rtx a2000 6gb"]),
    ("V100", &["v100", "tesla v100", "v100 32gb"]),
    ("T4", &["t4", "tesla t4"]),
];

/// Detection patterns, compiled case-insensitive and searched anywhere in the
/// raw title.
pub const DEFAULT_PATTERNS: &[(&str, &str)] = &[
    ("H100", r"\bh100\b"),
    ("A100_80GB", r"\ba100\b.*\b80\s?gb\b|\b80\s?gb\b.*\ba100\b"),
    ("A100_40GB", r"\ba100\b"),
    ("L40S", r"\bl40s\b"),
    ("L4", r"\bl4\b"),
    ("A10", r"\ba10\b"),
    ("A2", r"\ba2\b"),
    ("RTX_A6000", r"\ba6000\b"),
    ("RTX_A5000", r"\ba5000\b"),
    ("RTX_A4000", r"\ba4000\b"),
    (
        "RTX_A2000_12GB",
        r"\ba\s?2000\b.*\b12\s?gb\b|\b12\s?gb\b.*\ba\s?2000\b",
    ),
    ("RTX_A2000", r"\ba\s?2000\b"),
    ("V100", r"\bv100\b"),
    ("T4", r"\bt4\b"),
];

/// Canonical id of the 12GB A2000, which the fuzzy stage checks ahead of the
/// shorter `A2` aliases.
pub const A2000_12GB_ID: &str = "RTX_A2000_12GB";
