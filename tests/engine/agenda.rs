//! Integration tests for conflict resolution and the focus stack.

use std::sync::Arc;

use tinderbox_engine::{
    AuditLog, Condition, Pattern, Rule, RuleBaseBuilder, Session, SessionListener, SessionState,
};
use tinderbox_storage::Fact;

fn noop() -> tinderbox_engine::Action {
    Arc::new(|_, _| Ok(()))
}

fn fired_names(log: &AuditLog) -> Vec<String> {
    log.fired_rules().iter().map(|r| r.to_string()).collect()
}

// =============================================================================
// Conflict Resolution
// =============================================================================

#[test]
fn higher_salience_fires_first() {
    let mut builder = RuleBaseBuilder::new();
    let order = builder.interner_mut().intern_type("Order");

    builder.add_rule(
        Rule::new("fifty", Condition::new().pattern(Pattern::new(order)), noop())
            .with_salience(50),
    );
    builder.add_rule(
        Rule::new("hundred", Condition::new().pattern(Pattern::new(order)), noop())
            .with_salience(100),
    );
    builder.add_rule(
        Rule::new("minus", Condition::new().pattern(Pattern::new(order)), noop())
            .with_salience(-10),
    );
    let base = Arc::new(builder.build().unwrap());

    let log = Arc::new(AuditLog::new());
    let mut session = Session::new(base);
    session.add_listener(Arc::clone(&log) as Arc<dyn SessionListener>);
    session.insert(Fact::new(order)).unwrap();

    assert_eq!(session.fire_all_rules().unwrap(), 3);
    assert_eq!(fired_names(&log), vec!["hundred", "fifty", "minus"]);
}

#[test]
fn equal_salience_fires_in_activation_order() {
    let mut builder = RuleBaseBuilder::new();
    let order = builder.interner_mut().intern_type("Order");
    let member = builder.interner_mut().intern_type("Member");

    builder.add_rule(Rule::new(
        "on-order",
        Condition::new().pattern(Pattern::new(order)),
        noop(),
    ));
    builder.add_rule(Rule::new(
        "on-member",
        Condition::new().pattern(Pattern::new(member)),
        noop(),
    ));
    let base = Arc::new(builder.build().unwrap());

    let log = Arc::new(AuditLog::new());
    let mut session = Session::new(base);
    session.add_listener(Arc::clone(&log) as Arc<dyn SessionListener>);

    // Member inserted first, so its activation is older.
    session.insert(Fact::new(member)).unwrap();
    session.insert(Fact::new(order)).unwrap();

    assert_eq!(session.fire_all_rules().unwrap(), 2);
    assert_eq!(fired_names(&log), vec!["on-member", "on-order"]);
}

// =============================================================================
// Agenda Groups and Focus
// =============================================================================

#[test]
fn unfocused_group_does_not_fire() {
    let mut builder = RuleBaseBuilder::new();
    let order = builder.interner_mut().intern_type("Order");

    builder.add_rule(
        Rule::new("gated", Condition::new().pattern(Pattern::new(order)), noop())
            .with_agenda_group("pricing"),
    );
    let base = Arc::new(builder.build().unwrap());

    let mut session = Session::new(base);
    session.insert(Fact::new(order)).unwrap();

    // Activation sits in "pricing"; MAIN has nothing.
    assert_eq!(session.fire_all_rules().unwrap(), 0);
    assert_eq!(session.pending_count(), 1);

    session.set_focus("pricing").unwrap();
    assert_eq!(session.fire_all_rules().unwrap(), 1);
}

#[test]
fn exhausted_group_pops_back_to_main() {
    let mut builder = RuleBaseBuilder::new();
    let order = builder.interner_mut().intern_type("Order");

    builder.add_rule(
        Rule::new("priced", Condition::new().pattern(Pattern::new(order)), noop())
            .with_agenda_group("pricing"),
    );
    builder.add_rule(Rule::new(
        "booked",
        Condition::new().pattern(Pattern::new(order)),
        noop(),
    ));
    let base = Arc::new(builder.build().unwrap());

    let log = Arc::new(AuditLog::new());
    let mut session = Session::new(base);
    session.add_listener(Arc::clone(&log) as Arc<dyn SessionListener>);
    session.insert(Fact::new(order)).unwrap();
    session.set_focus("pricing").unwrap();

    // One call drains pricing, pops it, and continues with MAIN.
    assert_eq!(session.fire_all_rules().unwrap(), 2);
    assert_eq!(fired_names(&log), vec!["priced", "booked"]);
    assert_eq!(session.state(), SessionState::FiredOut);
}

#[test]
fn stacked_groups_fire_top_down() {
    let mut builder = RuleBaseBuilder::new();
    let order = builder.interner_mut().intern_type("Order");

    for group in ["validation", "pricing"] {
        builder.add_rule(
            Rule::new(
                group,
                Condition::new().pattern(Pattern::new(order)),
                noop(),
            )
            .with_agenda_group(group),
        );
    }
    let base = Arc::new(builder.build().unwrap());

    let log = Arc::new(AuditLog::new());
    let mut session = Session::new(base);
    session.add_listener(Arc::clone(&log) as Arc<dyn SessionListener>);
    session.insert(Fact::new(order)).unwrap();

    // Last pushed group has focus first.
    session.set_focus("validation").unwrap();
    session.set_focus("pricing").unwrap();

    assert_eq!(session.fire_all_rules().unwrap(), 2);
    assert_eq!(fired_names(&log), vec!["pricing", "validation"]);
}

#[test]
fn main_survives_repeated_fire_calls() {
    let mut builder = RuleBaseBuilder::new();
    let order = builder.interner_mut().intern_type("Order");

    builder.add_rule(Rule::new(
        "plain",
        Condition::new().pattern(Pattern::new(order)),
        noop(),
    ));
    let base = Arc::new(builder.build().unwrap());

    let mut session = Session::new(base);
    assert_eq!(session.fire_all_rules().unwrap(), 0);

    session.insert(Fact::new(order)).unwrap();
    assert_eq!(session.fire_all_rules().unwrap(), 1);

    session.insert(Fact::new(order)).unwrap();
    assert_eq!(session.fire_all_rules().unwrap(), 1);
}

// =============================================================================
// Edge Cases
// =============================================================================

#[test]
fn empty_agenda_returns_zero_without_events() {
    let mut builder = RuleBaseBuilder::new();
    let order = builder.interner_mut().intern_type("Order");
    builder.add_rule(Rule::new(
        "unmatched",
        Condition::new().pattern(Pattern::new(order)),
        noop(),
    ));
    let base = Arc::new(builder.build().unwrap());

    let log = Arc::new(AuditLog::new());
    let mut session = Session::new(base);
    session.add_listener(Arc::clone(&log) as Arc<dyn SessionListener>);

    assert_eq!(session.fire_all_rules().unwrap(), 0);
    assert!(log.is_empty());
    assert_eq!(session.state(), SessionState::FiredOut);
}

#[test]
fn halt_leaves_focus_and_agenda_intact() {
    let mut builder = RuleBaseBuilder::new();
    let order = builder.interner_mut().intern_type("Order");

    builder.add_rule(
        Rule::new(
            "stopper",
            Condition::new().pattern(Pattern::new(order)),
            Arc::new(|session, _| {
                session.halt();
                Ok(())
            }),
        )
        .with_salience(10),
    );
    builder.add_rule(Rule::new(
        "later",
        Condition::new().pattern(Pattern::new(order)),
        noop(),
    ));
    let base = Arc::new(builder.build().unwrap());

    let mut session = Session::new(base);
    session.insert(Fact::new(order)).unwrap();

    assert_eq!(session.fire_all_rules().unwrap(), 1);
    assert_eq!(session.state(), SessionState::Halted);

    // The next call resumes from where the halt left off.
    assert_eq!(session.fire_all_rules().unwrap(), 1);
    assert_eq!(session.state(), SessionState::FiredOut);
}
