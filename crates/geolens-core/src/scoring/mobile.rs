use super::{CategoryScorer, Metric, MetricAdvice, finalize, ratio_score};
use crate::signals::mobile::MobileSignals;
use crate::types::{Category, CategoryScore, ExtractedContent, Priority};

pub(crate) static VIEWPORT: MetricAdvice = MetricAdvice {
    name: "viewport",
    finding: "Viewport meta tag is missing, not device-width, or blocks zooming",
    recommendation: "Declare a device-width viewport and keep pinch zoom enabled",
    priority: Priority::High,
    implementation: "<meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">",
};

pub(crate) static RESPONSIVE_IMAGES: MetricAdvice = MetricAdvice {
    name: "responsiveImages",
    finding: "Images are served at a single size",
    recommendation: "Provide srcset or <picture> sources so phones download smaller images",
    priority: Priority::Medium,
    implementation: "<img src=\"hero-800.jpg\" srcset=\"hero-400.jpg 400w, hero-800.jpg 800w\" sizes=\"100vw\" alt=\"...\">",
};

pub(crate) static MEDIA_QUERIES: MetricAdvice = MetricAdvice {
    name: "mediaQueries",
    finding: "No responsive CSS breakpoints detected",
    recommendation: "Add media queries that adapt the layout to small screens",
    priority: Priority::Medium,
    implementation: "@media (max-width: 600px) { .layout { flex-direction: column; } }",
};

pub(crate) static MOBILE_UX: MetricAdvice = MetricAdvice {
    name: "mobileUx",
    finding: "Mobile usability extras are missing or fixed-width elements overflow",
    recommendation: "Remove wide fixed-width elements and add touch icons, theme color and lazy loading",
    priority: Priority::Low,
    implementation: "<link rel=\"apple-touch-icon\" href=\"/icon.png\"> <meta name=\"theme-color\" content=\"#ffffff\"> <img loading=\"lazy\" ...>",
};

/// Mobile readiness from HTML-only probes
#[derive(Debug, Clone)]
pub struct MobileScorer {
    pub threshold: u8,
}

impl CategoryScorer for MobileScorer {
    fn category(&self) -> Category {
        Category::MobileOptimization
    }

    fn score(&self, content: &ExtractedContent) -> CategoryScore {
        let signals = &content.mobile_signals;
        let metrics = [
            Metric::new(&VIEWPORT, viewport(signals)),
            // No images: nothing to make responsive
            Metric::new(
                &RESPONSIVE_IMAGES,
                ratio_score(signals.responsive_images, signals.total_images, 100),
            ),
            Metric::new(&MEDIA_QUERIES, media_queries(signals)),
            Metric::new(&MOBILE_UX, mobile_ux(signals)),
        ];
        finalize(self.category(), &metrics, self.threshold)
    }
}

fn viewport(signals: &MobileSignals) -> u8 {
    let base: u8 = if signals.device_width {
        100
    } else if signals.has_viewport {
        50
    } else {
        0
    };
    if signals.zoom_disabled {
        base.saturating_sub(30)
    } else {
        base
    }
}

fn media_queries(signals: &MobileSignals) -> u8 {
    if signals.media_queries > 0 || signals.media_stylesheets > 0 {
        100
    } else if signals.stylesheets > 0 {
        // External CSS may hold breakpoints we cannot see
        60
    } else {
        30
    }
}

fn mobile_ux(signals: &MobileSignals) -> u8 {
    let mut score = 40u8;
    if signals.fixed_width_elements == 0 {
        score += 20;
    }
    if signals.apple_touch_icon || signals.theme_color || signals.web_manifest {
        score += 20;
    }
    if signals.tel_links > 0 || signals.amp_link {
        score += 10;
    }
    if signals.lazy_images > 0 {
        score += 10;
    }
    score
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scoring::test_support::manual;

    #[test]
    fn bare_page_has_no_viewport() {
        let score = MobileScorer { threshold: 70 }.score(&manual("<p>Hello</p>"));
        assert_eq!(score.metric("viewport"), Some(0));
        assert_eq!(score.metric("responsiveImages"), Some(100));
        assert_eq!(score.metric("mediaQueries"), Some(30));
        assert_eq!(score.metric("mobileUx"), Some(60));
        assert_eq!(score.score, 48);
    }

    #[test]
    fn zoom_lock_costs_viewport_points() {
        let content = manual(
            r#"<meta name="viewport" content="width=device-width, initial-scale=1, maximum-scale=1">"#,
        );
        assert_eq!(viewport(&content.mobile_signals), 70);
    }

    #[test]
    fn external_stylesheets_get_partial_credit() {
        let content = manual(r#"<link rel="stylesheet" href="/site.css">"#);
        assert_eq!(media_queries(&content.mobile_signals), 60);
    }
}
