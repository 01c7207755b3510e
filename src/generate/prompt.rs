// src/generate/prompt.rs
use crate::generate::mode::Mode;

const KEYWORD_SLOT: &str = "{keyword}";
const PURPOSE_SLOT: &str = "{purpose}";
const CONDITIONS_SLOT: &str = "{conditions}";

const BASE_TEMPLATE: &str = "キーワード「{keyword}」について、Web上の情報を想定して解説してください。

【目的】
{purpose}としてアウトプットを作成する。

【条件】
- 専門用語は使わず、中学生でもわかるように。
- 視聴者の興味を引く「フック（掴み）」を入れること。
- 結論→理由→具体例の順で構成する。
- 箇条書きや改行を使い、読みやすく整形する。
{conditions}
";

/// Fill the template for `mode` with `term`. The term is inserted verbatim.
pub fn build_prompt(term: &str, mode: Mode) -> String {
    // Purpose and conditions first so a term containing a slot name stays literal.
    BASE_TEMPLATE
        .replace(PURPOSE_SLOT, mode.label())
        .replace(CONDITIONS_SLOT, mode.template())
        .replacen(KEYWORD_SLOT, term, 1)
}
