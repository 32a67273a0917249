//! Statistic counters that animate from zero to their value when first shown.
use crate::config::{BehaviorConfig, compile};
use html::NodeId;
use page::{Listener, ObserverId, Page, PageEvent};
use std::collections::HashSet;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CountTarget {
    pub value: u64,
    /// Whether the rendered number keeps a `+` suffix.
    pub plus: bool,
}

impl CountTarget {
    pub fn render(&self, value: u64) -> String {
        if self.plus {
            format!("{value}+")
        } else {
            value.to_string()
        }
    }
}

/// Leading integer of `text` (after whitespace). `None` when there are no digits.
pub fn parse_count(text: &str) -> Option<CountTarget> {
    let trimmed = text.trim_start();
    let end = trimmed
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(trimmed.len());
    let value = trimmed[..end].parse().ok()?;
    Some(CountTarget {
        value,
        plus: text.contains('+'),
    })
}

pub fn ease_out_cubic(t: f64) -> f64 {
    let t = t.clamp(0.0, 1.0);
    1.0 - (1.0 - t).powi(3)
}

/// Value shown `elapsed_ms` into an animation of `duration_ms`.
pub fn value_at(target: u64, elapsed_ms: f64, duration_ms: f64) -> u64 {
    if !(duration_ms > 0.0) || elapsed_ms >= duration_ms {
        return target;
    }
    let progress = ease_out_cubic(elapsed_ms / duration_ms);
    ((target as f64) * progress).floor() as u64
}

struct Counter {
    node: NodeId,
    target: CountTarget,
    started_at: Option<f64>,
}

pub struct CountUp {
    observer: ObserverId,
    duration_ms: f64,
    triggered: HashSet<NodeId>,
    running: Vec<Counter>,
}

impl CountUp {
    pub fn attach(page: &mut Page, config: &BehaviorConfig) -> Option<Self> {
        let sel = compile(&config.selectors.count_up, "count-up")?;
        let doc = page.document();
        let targets = doc.query_selector_all(doc.root(), &sel);
        if targets.is_empty() {
            return None;
        }
        let observer = page.create_observer(config.count_up.observer);
        for target in targets {
            page.observe(observer, target);
        }
        Some(Self {
            observer,
            duration_ms: config.count_up.duration_ms,
            triggered: HashSet::new(),
            running: Vec::new(),
        })
    }

    /// Counters still waiting for frames.
    pub fn running(&self) -> usize {
        self.running.len()
    }

    fn start(&mut self, page: &mut Page, node: NodeId) {
        if !self.triggered.insert(node) {
            return;
        }
        page.unobserve(self.observer, node);
        let text = page.document().text_content(node);
        match parse_count(&text) {
            Some(target) => {
                log::debug!(target: "behaviors.count_up", "counting {node} to {}", target.value);
                self.running.push(Counter {
                    node,
                    target,
                    started_at: None,
                });
            }
            None => log::debug!(target: "behaviors.count_up", "{node}: {text:?} is not a number"),
        }
    }

    fn tick(&mut self, page: &mut Page, now_ms: f64) {
        let duration = self.duration_ms;
        let doc = page.document_mut();
        self.running.retain_mut(|counter| {
            let started = *counter.started_at.get_or_insert(now_ms);
            let elapsed = now_ms - started;
            let value = value_at(counter.target.value, elapsed, duration);
            doc.set_text_content(counter.node, &counter.target.render(value));
            elapsed < duration
        });
    }
}

impl Listener for CountUp {
    fn name(&self) -> &'static str {
        "count-up"
    }

    fn handle(&mut self, page: &mut Page, event: &PageEvent) {
        match event {
            PageEvent::Intersection(entry)
                if entry.observer == self.observer && entry.is_intersecting =>
            {
                self.start(page, entry.target);
            }
            PageEvent::Frame { now_ms } if !self.running.is_empty() => self.tick(page, *now_ms),
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use page::LayoutBox;

    #[test]
    fn parses_leading_digits() {
        assert_eq!(
            parse_count("1200+"),
            Some(CountTarget {
                value: 1200,
                plus: true
            })
        );
        assert_eq!(parse_count("  42 cases").map(|t| t.value), Some(42));
        assert_eq!(parse_count("Team"), None);
        assert_eq!(parse_count(""), None);
    }

    #[test]
    fn easing_hits_endpoints() {
        assert_eq!(ease_out_cubic(0.0), 0.0);
        assert_eq!(ease_out_cubic(1.0), 1.0);
        assert!((ease_out_cubic(0.5) - 0.875).abs() < 1e-12);
        assert_eq!(value_at(1200, 1000.0, 2000.0), 1050);
        assert_eq!(value_at(1200, 2500.0, 2000.0), 1200);
        assert_eq!(value_at(7, 0.0, 0.0), 7);
    }

    fn stats_page() -> (Page, NodeId, NodeId) {
        let mut page = Page::from_html(
            r#"<body><span id="n" class="stat-number">1200+</span><span id="t" class="stat-number">Team</span></body>"#,
        );
        let n = page.document().get_element_by_id("n").unwrap();
        let t = page.document().get_element_by_id("t").unwrap();
        page.set_layout_box(n, LayoutBox::new(100.0, 40.0));
        page.set_layout_box(t, LayoutBox::new(100.0, 40.0));
        (page, n, t)
    }

    #[test]
    fn animates_to_target_keeping_suffix() {
        let (mut page, n, t) = stats_page();
        let count = CountUp::attach(&mut page, &BehaviorConfig::default()).unwrap();
        let mut listeners: Vec<Box<dyn Listener>> = vec![Box::new(count)];
        page.run_until_idle(&mut listeners);

        page.advance_frame(16.0);
        page.run_until_idle(&mut listeners);
        assert_eq!(page.document().text_content(n), "0+");

        page.advance_frame(1000.0);
        page.run_until_idle(&mut listeners);
        assert_eq!(page.document().text_content(n), "1050+");

        page.advance_frame(1000.0);
        page.run_until_idle(&mut listeners);
        assert_eq!(page.document().text_content(n), "1200+");
        assert_eq!(page.document().text_content(t), "Team");
    }

    #[test]
    fn fires_once_per_element() {
        let (mut page, n, _) = stats_page();
        let mut count = CountUp::attach(&mut page, &BehaviorConfig::default()).unwrap();
        let observer = count.observer;
        page.run_until_idle(&mut []);
        count.start(&mut page, n);
        count.start(&mut page, n);
        assert_eq!(count.running(), 1);
        assert_eq!(page.observed_count(observer), 1);
    }
}
