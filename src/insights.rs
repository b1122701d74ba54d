//! Rule-based insight messages over member and team metrics.
//!
//! Each rule is a standalone function returning at most one [`Insight`]. The
//! rule tables are evaluated in full and in order; thresholds are fixed.

use serde::Serialize;

use crate::metrics::{
    MemberSummary, TeamSnapshot, member_summary, outbound_wait_targets, team_pair_average,
};
use crate::model::WorkItem;

pub const BOTTLENECK_INBOUND: usize = 2;
pub const HIGH_CROSS_GROUP: u32 = 50;
pub const INSULAR_BELOW: u32 = 20;
pub const PAIRING_FACTOR: f64 = 1.5;
pub const BACKLOG_OUTBOUND: usize = 3;
pub const COLLAB_JUMP: usize = 2;
pub const REPEATED_WAIT: usize = 2;
pub const TEAM_BOTTLENECK_INBOUND: usize = 3;
pub const TEAM_PAIRER_MIN: usize = 3;
pub const WAIT_PAIR_IMBALANCE: f64 = 1.5;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum InsightKind {
    Warning,
    Success,
    Info,
    Neutral,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Insight {
    #[serde(rename = "type")]
    pub kind: InsightKind,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

impl Insight {
    fn new(kind: InsightKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            detail: None,
        }
    }

    fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }
}

/// Inputs for the personal rules of one member.
pub struct PersonalContext<'a> {
    pub summary: &'a MemberSummary,
    pub previous: Option<&'a MemberSummary>,
    pub team_pair_average: f64,
    pub wait_targets: &'a [(String, usize)],
}

type PersonalRule = fn(&PersonalContext<'_>) -> Option<Insight>;
type TeamRule = fn(&TeamSnapshot) -> Option<Insight>;

pub const PERSONAL_RULES: &[PersonalRule] = &[
    bottleneck_warning,
    no_bottleneck,
    high_cross_group,
    insular,
    top_collaborator,
    above_average_pairing,
    wait_backlog,
    inbound_increase,
    inbound_decrease,
    collaboration_jump,
    repeated_wait_target,
    no_collaboration,
];

pub const TEAM_RULES: &[TeamRule] = &[biggest_bottleneck, most_active_pairer, wait_pair_imbalance];

pub fn bottleneck_warning(ctx: &PersonalContext<'_>) -> Option<Insight> {
    let inbound = ctx.summary.wait_in;
    (inbound >= BOTTLENECK_INBOUND).then(|| {
        Insight::new(
            InsightKind::Warning,
            format!("{inbound} waits point at you this period"),
        )
        .with_detail("Others are blocked on your work; consider unblocking them first.")
    })
}

pub fn no_bottleneck(ctx: &PersonalContext<'_>) -> Option<Insight> {
    (ctx.summary.wait_in == 0 && ctx.summary.total_collaborations >= 1)
        .then(|| Insight::new(InsightKind::Success, "Nobody is waiting on you"))
}

pub fn high_cross_group(ctx: &PersonalContext<'_>) -> Option<Insight> {
    let score = ctx.summary.cross_group_score;
    (score >= HIGH_CROSS_GROUP).then(|| {
        Insight::new(
            InsightKind::Success,
            format!("{score}% of your collaboration crosses group lines"),
        )
    })
}

pub fn insular(ctx: &PersonalContext<'_>) -> Option<Insight> {
    let score = ctx.summary.cross_group_score;
    (score > 0 && score < INSULAR_BELOW).then(|| {
        Insight::new(
            InsightKind::Neutral,
            format!("Only {score}% of your collaboration leaves your group"),
        )
    })
}

pub fn top_collaborator(ctx: &PersonalContext<'_>) -> Option<Insight> {
    let top = ctx.summary.top_collaborator()?;
    Some(
        Insight::new(
            InsightKind::Info,
            format!("You worked most with {}", top.name),
        )
        .with_detail(format!(
            "{} references: {} pair, {} wait, {} other",
            top.total, top.pair, top.wait, top.other
        )),
    )
}

pub fn above_average_pairing(ctx: &PersonalContext<'_>) -> Option<Insight> {
    let pairs = ctx.summary.pair_count as f64;
    (ctx.team_pair_average > 0.0 && pairs > ctx.team_pair_average * PAIRING_FACTOR).then(|| {
        Insight::new(
            InsightKind::Success,
            format!(
                "You paired {} times, well above the team average of {:.1}",
                ctx.summary.pair_count, ctx.team_pair_average
            ),
        )
    })
}

pub fn wait_backlog(ctx: &PersonalContext<'_>) -> Option<Insight> {
    let outbound = ctx.summary.wait_out;
    (outbound >= BACKLOG_OUTBOUND).then(|| {
        Insight::new(
            InsightKind::Warning,
            format!("You are waiting on others {outbound} times"),
        )
    })
}

pub fn inbound_increase(ctx: &PersonalContext<'_>) -> Option<Insight> {
    let previous = ctx.previous?;
    (ctx.summary.wait_in > previous.wait_in).then(|| {
        Insight::new(
            InsightKind::Warning,
            format!(
                "Waits on you rose from {} to {}",
                previous.wait_in, ctx.summary.wait_in
            ),
        )
    })
}

pub fn inbound_decrease(ctx: &PersonalContext<'_>) -> Option<Insight> {
    let previous = ctx.previous?;
    (ctx.summary.wait_in < previous.wait_in).then(|| {
        Insight::new(
            InsightKind::Success,
            format!(
                "Waits on you fell from {} to {}",
                previous.wait_in, ctx.summary.wait_in
            ),
        )
    })
}

pub fn collaboration_jump(ctx: &PersonalContext<'_>) -> Option<Insight> {
    let previous = ctx.previous?;
    let gained = ctx
        .summary
        .total_collaborations
        .saturating_sub(previous.total_collaborations);
    (gained > COLLAB_JUMP).then(|| {
        Insight::new(
            InsightKind::Info,
            format!("{gained} more collaborations than last period"),
        )
    })
}

pub fn repeated_wait_target(ctx: &PersonalContext<'_>) -> Option<Insight> {
    let (name, count) = ctx.wait_targets.first()?;
    (*count >= REPEATED_WAIT).then(|| {
        Insight::new(
            InsightKind::Neutral,
            format!("You waited on {name} {count} times"),
        )
        .with_detail("A recurring dependency may be worth a standing sync.")
    })
}

pub fn no_collaboration(ctx: &PersonalContext<'_>) -> Option<Insight> {
    (ctx.summary.total_collaborations == 0)
        .then(|| Insight::new(InsightKind::Neutral, "No collaboration recorded"))
}

pub fn biggest_bottleneck(team: &TeamSnapshot) -> Option<Insight> {
    let top = team.bottlenecks.first()?;
    (top.inbound >= TEAM_BOTTLENECK_INBOUND).then(|| {
        Insight::new(
            InsightKind::Warning,
            format!("{} is the biggest bottleneck ({} waits)", top.member, top.inbound),
        )
        .with_detail(format!("Waiting: {}", top.waiters.join(", ")))
    })
}

pub fn most_active_pairer(team: &TeamSnapshot) -> Option<Insight> {
    let mut best: Option<&MemberSummary> = None;
    for summary in &team.summaries {
        if best.is_none_or(|current| summary.pair_count > current.pair_count) {
            best = Some(summary);
        }
    }
    let best = best?;
    (best.pair_count >= TEAM_PAIRER_MIN).then(|| {
        Insight::new(
            InsightKind::Info,
            format!("{} paired the most ({} times)", best.member, best.pair_count),
        )
    })
}

pub fn wait_pair_imbalance(team: &TeamSnapshot) -> Option<Insight> {
    let waits = team.total_wait as f64;
    let pairs = team.total_pair as f64;
    (waits > pairs * WAIT_PAIR_IMBALANCE).then(|| {
        Insight::new(
            InsightKind::Warning,
            format!(
                "The team logged {} waits against {} pairings",
                team.total_wait, team.total_pair
            ),
        )
    })
}

pub fn evaluate_personal(ctx: &PersonalContext<'_>) -> Vec<Insight> {
    PERSONAL_RULES.iter().filter_map(|rule| rule(ctx)).collect()
}

pub fn evaluate_team(team: &TeamSnapshot) -> Vec<Insight> {
    TEAM_RULES.iter().filter_map(|rule| rule(team)).collect()
}

/// Personal insights for `member`, with delta rules enabled when a prior
/// period is supplied.
pub fn personal_insights(
    items: &[WorkItem],
    member: &str,
    previous: Option<&[WorkItem]>,
) -> Vec<Insight> {
    let summary = member_summary(items, member);
    let previous_summary = previous.map(|previous| member_summary(previous, member));
    let wait_targets = outbound_wait_targets(items, member);

    evaluate_personal(&PersonalContext {
        summary: &summary,
        previous: previous_summary.as_ref(),
        team_pair_average: team_pair_average(items),
        wait_targets: &wait_targets,
    })
}

pub fn team_insights(items: &[WorkItem]) -> Vec<Insight> {
    evaluate_team(&TeamSnapshot::compute(items))
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::metrics::CollaboratorTally;
    use crate::model::Relation::{Pair, Wait};

    fn summary() -> MemberSummary {
        MemberSummary {
            member: "A".to_owned(),
            group: "X".to_owned(),
            ..MemberSummary::default()
        }
    }

    fn ctx<'a>(
        summary: &'a MemberSummary,
        previous: Option<&'a MemberSummary>,
        wait_targets: &'a [(String, usize)],
    ) -> PersonalContext<'a> {
        PersonalContext {
            summary,
            previous,
            team_pair_average: 0.0,
            wait_targets,
        }
    }

    fn kinds(insights: &[Insight]) -> Vec<InsightKind> {
        insights.iter().map(|insight| insight.kind).collect()
    }

    #[test]
    fn idle_member_gets_only_the_fallback() {
        let summary = summary();
        let insights = evaluate_personal(&ctx(&summary, None, &[]));
        assert_eq!(insights.len(), 1);
        assert_eq!(insights[0].message, "No collaboration recorded");
        assert_eq!(insights[0].kind, InsightKind::Neutral);
    }

    #[test]
    fn bottleneck_threshold_is_two() {
        let mut summary = summary();
        summary.wait_in = 1;
        assert!(bottleneck_warning(&ctx(&summary, None, &[])).is_none());
        summary.wait_in = 2;
        assert!(bottleneck_warning(&ctx(&summary, None, &[])).is_some());
    }

    #[test]
    fn no_bottleneck_needs_some_collaboration() {
        let mut summary = summary();
        assert!(no_bottleneck(&ctx(&summary, None, &[])).is_none());
        summary.total_collaborations = 1;
        assert!(no_bottleneck(&ctx(&summary, None, &[])).is_some());
    }

    #[test]
    fn cross_group_bands() {
        let mut summary = summary();
        for (score, high, low) in [(0, false, false), (10, false, true), (20, false, false), (50, true, false)] {
            summary.cross_group_score = score;
            let context = ctx(&summary, None, &[]);
            assert_eq!(high_cross_group(&context).is_some(), high, "score {score}");
            assert_eq!(insular(&context).is_some(), low, "score {score}");
        }
    }

    #[test]
    fn pairing_must_beat_one_and_a_half_times_average() {
        let mut summary = summary();
        summary.pair_count = 3;
        let mut context = ctx(&summary, None, &[]);
        context.team_pair_average = 2.0;
        assert!(above_average_pairing(&context).is_none());
        context.team_pair_average = 1.9;
        assert!(above_average_pairing(&context).is_some());
    }

    #[test]
    fn delta_rules_compare_periods() {
        let mut current = summary();
        current.wait_in = 3;
        current.total_collaborations = 6;
        let mut previous = summary();
        previous.wait_in = 1;
        previous.total_collaborations = 3;

        let context = ctx(&current, Some(&previous), &[]);
        assert!(inbound_increase(&context).is_some());
        assert!(inbound_decrease(&context).is_none());
        assert!(collaboration_jump(&context).is_some());

        previous.total_collaborations = 4;
        let context = ctx(&current, Some(&previous), &[]);
        assert!(collaboration_jump(&context).is_none());

        let context = ctx(&current, None, &[]);
        assert!(inbound_increase(&context).is_none());
    }

    #[test]
    fn repeated_wait_names_the_target() {
        let summary = summary();
        let targets = vec![("B".to_owned(), 2)];
        let insight = repeated_wait_target(&ctx(&summary, None, &targets)).expect("fires");
        assert_eq!(insight.message, "You waited on B 2 times");
    }

    #[test]
    fn all_applicable_rules_fire_in_order() {
        let mut summary = summary();
        summary.wait_in = 2;
        summary.wait_out = 3;
        summary.cross_group_score = 60;
        summary.total_collaborations = 5;
        summary.collaborators = vec![CollaboratorTally {
            name: "B".to_owned(),
            total: 3,
            pair: 0,
            wait: 3,
            other: 0,
        }];
        let targets = vec![("B".to_owned(), 3)];

        let insights = evaluate_personal(&ctx(&summary, None, &targets));
        assert_eq!(
            kinds(&insights),
            vec![
                InsightKind::Warning,
                InsightKind::Success,
                InsightKind::Info,
                InsightKind::Warning,
                InsightKind::Neutral,
            ]
        );
    }

    #[test]
    fn personal_insights_from_items() {
        let items = vec![
            WorkItem::new("A", "X").with("B", Wait).with("B", Wait),
            WorkItem::new("B", "Y"),
        ];
        let previous = vec![WorkItem::new("A", "X")];

        let insights = personal_insights(&items, "B", Some(&previous));
        let messages = insights
            .iter()
            .map(|insight| insight.message.as_str())
            .collect::<Vec<_>>();
        assert_eq!(
            messages,
            vec![
                "2 waits point at you this period",
                "Waits on you rose from 0 to 2",
                "No collaboration recorded",
            ]
        );
    }

    #[test]
    fn team_rules() {
        let items = vec![
            WorkItem::new("A", "X")
                .with("C", Wait)
                .with("B", Pair)
                .with("B", Pair)
                .with("D", Pair),
            WorkItem::new("B", "X").with("C", Wait),
            WorkItem::new("D", "Y").with("C", Wait),
        ];
        let insights = team_insights(&items);
        let messages = insights
            .iter()
            .map(|insight| insight.message.as_str())
            .collect::<Vec<_>>();
        assert_eq!(
            messages,
            vec![
                "C is the biggest bottleneck (3 waits)",
                "A paired the most (3 times)",
            ]
        );
        assert_eq!(insights[0].detail.as_deref(), Some("Waiting: A, B, D"));
    }

    #[test]
    fn wait_heavy_team_is_flagged() {
        let items = vec![
            WorkItem::new("A", "X").with("B", Wait).with("C", Wait),
            WorkItem::new("B", "X").with("A", Pair),
        ];
        let insights = team_insights(&items);
        assert_eq!(
            insights.last().map(|insight| insight.kind),
            Some(InsightKind::Warning)
        );
        assert!(team_insights(&[]).is_empty());
    }

    #[test]
    fn insight_serializes_with_type_tag() {
        let insight = Insight::new(InsightKind::Info, "hello");
        assert_eq!(
            serde_json::to_string(&insight).expect("serializes"),
            r#"{"type":"info","message":"hello"}"#
        );
    }
}
