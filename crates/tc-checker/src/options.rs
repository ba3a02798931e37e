/// Host-tunable behavior, grounded on `tsz_common::checker_options::CheckerOptions`
/// trimmed to the single axis this feature set can actually vary.
#[derive(Debug, Clone, Copy)]
pub struct CheckerOptions {
    /// Resolves the Open Question in spec §9 about `>>` on two signed
    /// Number operands. The observed source behavior folds it as `l << r`
    /// — almost certainly a bug, but changing constant-folding output
    /// silently would be a correctness regression for any caller depending
    /// on it. Defaults to `false` (preserve the source's behavior); a host
    /// that wants the fix sets this to `true` to get an actual right
    /// shift. See `DESIGN.md` for the full discussion.
    pub shift_right_signed_is_arithmetic: bool,
}

impl Default for CheckerOptions {
    fn default() -> Self {
        CheckerOptions { shift_right_signed_is_arithmetic: false }
    }
}
