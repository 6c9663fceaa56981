use super::{CategoryScorer, Metric, MetricAdvice, clamp_score, finalize};
use crate::config::{AiOptimizationWeights, ClarityTuning};
use crate::patterns::{HEDGE_WORDS, PRONOUNS};
use crate::types::{Category, CategoryScore, ExtractedContent, Priority};

pub(crate) static SEMANTIC_STRUCTURE: MetricAdvice = MetricAdvice {
    name: "semanticStructure",
    finding: "Page structure is hard for AI systems to segment",
    recommendation: "Wrap the primary content in <main>/<article> and break it up with headings, lists and tables",
    priority: Priority::High,
    implementation: "<main><article><h1>..</h1><section><h2>..</h2><ul>..</ul></section></article></main>",
};

pub(crate) static ANSWER_POTENTIAL: MetricAdvice = MetricAdvice {
    name: "answerPotential",
    finding: "Few passages are shaped as direct answers",
    recommendation: "Phrase subheadings as questions and answer each in the first sentence below it",
    priority: Priority::High,
    implementation: "<h2>How long does espresso extraction take?</h2><p>Espresso extraction takes 25-30 seconds...</p>",
};

pub(crate) static CLARITY: MetricAdvice = MetricAdvice {
    name: "clarity",
    finding: "Sentences are hard to quote: too long, too short or heavily hedged",
    recommendation: "Keep sentences around 12-22 words, state facts directly and address the reader",
    priority: Priority::Medium,
    implementation: "Replace 'it might possibly help' with 'it reduces load time by 40%'",
};

/// How readily AI answer engines can parse and quote the page
#[derive(Debug, Clone)]
pub struct AiOptimizationScorer {
    pub weights: AiOptimizationWeights,
    pub clarity: ClarityTuning,
    pub threshold: u8,
}

impl CategoryScorer for AiOptimizationScorer {
    fn category(&self) -> Category {
        Category::AiOptimization
    }

    fn score(&self, content: &ExtractedContent) -> CategoryScore {
        let metrics = [
            Metric::weighted(
                &SEMANTIC_STRUCTURE,
                semantic_structure(content),
                self.weights.semantic_structure,
            ),
            Metric::weighted(
                &ANSWER_POTENTIAL,
                answer_potential(content),
                self.weights.answer_potential,
            ),
            Metric::weighted(
                &CLARITY,
                clarity_score(&content.text_content, content.word_count, &self.clarity),
                self.weights.clarity,
            ),
        ];
        finalize(self.category(), &metrics, self.threshold)
    }
}

fn semantic_structure(content: &ExtractedContent) -> u8 {
    let mut score = content.ux_signals.semantic_score as f64 * 0.5;
    if content.headings.iter().filter(|h| h.level == 1).count() == 1 {
        score += 20.0;
    }
    if content
        .headings
        .iter()
        .filter(|h| h.level == 2 || h.level == 3)
        .count()
        >= 2
    {
        score += 15.0;
    }
    let structure = &content.ux_signals.structure;
    if structure.ordered_lists + structure.unordered_lists + structure.tables > 0 {
        score += 15.0;
    }
    clamp_score(score)
}

fn answer_potential(content: &ExtractedContent) -> u8 {
    let ai = &content.ai_signals;
    clamp_score(
        ai.answer_formats.score as f64 * 0.6
            + ai.factual.score as f64 * 0.2
            + ai.voice_search.score as f64 * 0.2,
    )
}

/// Readability proxy: sentence length band, hedging and reader address.
///
/// Zero words score 0.
pub(crate) fn clarity_score(text: &str, words: usize, tuning: &ClarityTuning) -> u8 {
    if words == 0 {
        return 0;
    }

    let sentences = text
        .split(['.', '!', '?'])
        .filter(|sentence| !sentence.trim().is_empty())
        .count()
        .max(1);
    let average = words as f64 / sentences as f64;
    let distance = if average < tuning.ideal_sentence_min {
        tuning.ideal_sentence_min - average
    } else if average > tuning.ideal_sentence_max {
        average - tuning.ideal_sentence_max
    } else {
        0.0
    };
    let mut score = 100.0 - distance * 4.0;

    let hedges_per_hundred = HEDGE_WORDS.count(text) as f64 * 100.0 / words as f64;
    score -= tuning.hedge_penalty * hedges_per_hundred;

    let pronouns_per_hundred = PRONOUNS.count(text) as f64 * 100.0 / words as f64;
    if pronouns_per_hundred < tuning.pronoun_target {
        score -= ((tuning.pronoun_target - pronouns_per_hundred) * 5.0).min(10.0);
    }

    clamp_score(score)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scoring::test_support::manual;

    fn tuning() -> ClarityTuning {
        ClarityTuning::default()
    }

    #[test]
    fn empty_text_has_zero_clarity() {
        assert_eq!(clarity_score("", 0, &tuning()), 0);
    }

    #[test]
    fn ideal_sentences_score_high() {
        let sentence = "You can tune your grinder to pull a balanced shot in about thirty seconds every time. ";
        let text = sentence.repeat(5);
        let words = text.split_whitespace().count();
        assert_eq!(clarity_score(&text, words, &tuning()), 100);
    }

    #[test]
    fn hedging_and_run_on_sentences_cost_points() {
        let text = "Maybe this perhaps could be somewhat useful and it might possibly work in some cases for some people in some places at some times depending on many factors that are probably relevant";
        let words = text.split_whitespace().count();
        assert!(clarity_score(text, words, &tuning()) < 70);
    }

    #[test]
    fn structured_page_scores_semantic_structure() {
        let html = r#"
        <header>Site</header>
        <nav><a href="/">Home</a></nav>
        <main><article>
            <h1>Espresso</h1>
            <section><h2>Grind</h2><ul><li>Fine</li></ul></section>
            <section><h2>Dose</h2><p>Eighteen grams is typical.</p></section>
        </article></main>
        <footer>Footer</footer>
        "#;
        let content = manual(html);
        // half of a 90 semantic score, plus single H1, subheadings and a list
        assert_eq!(semantic_structure(&content), 95);
    }

    #[test]
    fn category_is_weighted() {
        let scorer = AiOptimizationScorer {
            weights: AiOptimizationWeights::default(),
            clarity: tuning(),
            threshold: 70,
        };
        let score = scorer.score(&manual("<p>Plain text without much structure at all here.</p>"));
        assert_eq!(score.metrics.len(), 3);
        assert!(score.score <= 100);
    }
}
