mod common;

use common::{
    assert_consistent, block_markup, check_consistent, delete_link, setup, setup_with, total_field,
};
use dom::{Document, Listener, parse_document, to_html};
use formset::{
    Formset, FormsetOptions, Hooks, MaxCount, RowEvent, add_allowed, observed_indices,
};
use std::cell::RefCell;
use std::rc::Rc;

fn items(rows: usize, max: Option<usize>) -> (Document, Formset) {
    setup(&block_markup("item", rows, max), FormsetOptions::with_prefix("item"))
}

#[test]
fn every_removal_subset_leaves_contiguous_rows() {
    const ROWS: usize = 5;
    for mask in 0u32..(1 << ROWS) {
        let (mut doc, mut formset) = items(ROWS, None);
        let rows = formset.rows(&doc);
        for (position, &row) in rows.iter().enumerate() {
            if mask & (1 << position) != 0 {
                let link = delete_link(&doc, row);
                formset.remove(&mut doc, link).unwrap();
            }
        }
        let survivors: Vec<_> = rows
            .iter()
            .enumerate()
            .filter(|(position, _)| mask & (1 << position) == 0)
            .map(|(_, &row)| row)
            .collect();
        assert_eq!(formset.rows(&doc), survivors, "mask {mask:05b}");
        if let Err(report) = check_consistent(&doc, &formset) {
            panic!("mask {mask:05b}:\n{report}");
        }
    }
}

#[test]
fn interleaved_adds_and_removes_stay_consistent() {
    let (mut doc, mut formset) = items(2, None);
    // Deterministic walk: add on even steps, remove a rotating row on odd ones.
    for step in 0..40usize {
        if step % 2 == 0 || formset.total() == 0 {
            formset.add(&mut doc).unwrap();
        } else {
            let rows = formset.rows(&doc);
            let victim = rows[(step * 7) % rows.len()];
            let link = delete_link(&doc, victim);
            formset.remove(&mut doc, link).unwrap();
        }
        assert_consistent(&doc, &formset);
    }
}

#[test]
fn renumbering_is_idempotent() {
    let (mut doc, mut formset) = items(4, None);
    let second = formset.rows(&doc)[1];
    let link = delete_link(&doc, second);
    formset.remove(&mut doc, link).unwrap();

    let before = to_html(&doc);
    assert!(formset.renumber(&mut doc).unwrap().is_empty());
    assert!(doc.take_patches().is_empty());
    assert_eq!(to_html(&doc), before);
}

#[test]
fn renumber_repairs_hand_edited_identifiers() {
    let (mut doc, formset) = items(2, None);
    let input = doc.element_by_id("id_item-1-name").unwrap();
    doc.set_attr(input, "name", "item-7-name").unwrap();
    let changed = formset.renumber(&mut doc).unwrap();
    assert_eq!(changed.len(), 1);
    assert_eq!(doc.attr(input, "name"), Some("item-1-name"));
}

#[test]
fn gate_matches_the_capacity_rule_for_every_limit() {
    for limit in 0..5usize {
        let (mut doc, mut formset) = items(0, Some(limit));
        let wrapper = formset.add_affordance().wrapper;
        for _ in 0..limit + 2 {
            let effect = formset.add(&mut doc).unwrap();
            assert_eq!(effect.add_visible, add_allowed(formset.total(), MaxCount::Limit(limit)));
            assert_eq!(doc.is_hidden(wrapper), !effect.add_visible);
        }
        assert_eq!(formset.total(), limit);
        assert_eq!(total_field(&doc, "item"), Some(limit));
    }
}

#[test]
fn zero_limit_hides_the_add_affordance_from_the_start() {
    let (doc, formset) = items(0, Some(0));
    assert_eq!(formset.max(), MaxCount::Limit(0));
    assert!(doc.is_hidden(formset.add_affordance().wrapper));
}

#[test]
fn refused_add_does_not_touch_the_document() {
    let (mut doc, mut formset) = items(1, Some(1));
    let before = to_html(&doc);
    let effect = formset.add(&mut doc).unwrap();
    assert_eq!(effect.added, None);
    assert!(effect.patches.is_empty());
    assert!(effect.events.is_empty());
    assert_eq!(to_html(&doc), before);
    assert_eq!(formset.total(), 1);
}

#[test]
fn non_numeric_max_disables_adding() {
    let markup = block_markup("item", 0, None).replace(
        r#"id="id_item-MAX_NUM_FORMS" value="""#,
        r#"id="id_item-MAX_NUM_FORMS" value="lots""#,
    );
    let (mut doc, mut formset) = setup(&markup, FormsetOptions::with_prefix("item"));
    assert_eq!(formset.max(), MaxCount::Limit(0));
    assert!(!formset.add_visible());
    assert_eq!(formset.add(&mut doc).unwrap().added, None);
}

#[test]
fn row_count_wins_over_a_stale_total_field() {
    let markup = block_markup("item", 3, None).replace(
        r#"id="id_item-TOTAL_FORMS" value="3""#,
        r#"id="id_item-TOTAL_FORMS" value="9""#,
    );
    let (mut doc, mut formset) = setup(&markup, FormsetOptions::with_prefix("item"));
    assert_eq!(formset.total(), 3);
    assert_eq!(total_field(&doc, "item"), Some(3));
    let row = formset.add(&mut doc).unwrap().added.unwrap();
    assert!(observed_indices(&doc, row, "item").iter().all(|&i| i == 3));
}

#[test]
fn cloned_rows_keep_template_listeners() {
    let mut doc = parse_document(&block_markup("item", 0, None));
    let template = doc
        .element_by_id("id_item-__prefix__-name")
        .unwrap();
    doc.bind(template, Listener::new("change", "item:recalc")).unwrap();
    let mut formset =
        Formset::setup(&mut doc, FormsetOptions::with_prefix("item"), Hooks::new()).unwrap();

    let row = formset.add(&mut doc).unwrap().added.unwrap();
    let input = doc.element_by_id("id_item-0-name").unwrap();
    assert_ne!(input, template);
    assert!(doc.ancestors(input).any(|a| a == row));
    let hits = doc.dispatch(input, "change");
    assert_eq!(hits.len(), 1);
    assert_eq!(&*hits[0].1, "item:recalc");
}

#[test]
fn added_hook_sees_a_fully_wired_row() {
    let seen: Rc<RefCell<Vec<String>>> = Rc::default();
    let sink = Rc::clone(&seen);
    let hooks = Hooks::new().on_added(move |doc, row| {
        let link = doc.elements_with_classes(row, "delete-link")[0];
        let wired = !doc.listeners(link).is_empty();
        let id = doc.attr(row, "id").unwrap_or_default().to_string();
        sink.borrow_mut().push(format!("{id} attached={} wired={wired}", doc.is_attached(row)));
    });
    let (mut doc, mut formset) =
        setup_with(&block_markup("item", 1, None), FormsetOptions::with_prefix("item"), hooks);
    let effect = formset.add(&mut doc).unwrap();
    assert_eq!(*seen.borrow(), ["item-1 attached=true wired=true"]);
    assert!(matches!(effect.events[..], [RowEvent::Added { index: 1, .. }]));
}

#[test]
fn removed_hook_may_detach_the_row_itself() {
    let hooks = Hooks::new().on_removed(|doc, row| {
        doc.remove_subtree(row).unwrap();
    });
    let (mut doc, mut formset) =
        setup_with(&block_markup("item", 3, None), FormsetOptions::with_prefix("item"), hooks);
    let first = formset.rows(&doc)[0];
    let link = delete_link(&doc, first);
    let effect = formset.remove(&mut doc, link).unwrap();
    assert_eq!(effect.removed, Some(first));
    assert_eq!(effect.events, [RowEvent::Removing { row: first }]);
    assert_consistent(&doc, &formset);
}

#[test]
fn collections_on_one_page_do_not_interfere() {
    let markup = format!(
        "{}{}",
        block_markup("item", 2, None),
        block_markup("addr", 1, Some(2))
    );
    let mut doc = parse_document(&markup);
    let mut items =
        Formset::setup(&mut doc, FormsetOptions::with_prefix("item"), Hooks::new()).unwrap();
    let mut addrs =
        Formset::setup(&mut doc, FormsetOptions::with_prefix("addr"), Hooks::new()).unwrap();

    items.add(&mut doc).unwrap();
    let first_item = items.rows(&doc)[0];
    let link = delete_link(&doc, first_item);
    items.remove(&mut doc, link).unwrap();
    addrs.add(&mut doc).unwrap();

    assert_eq!(items.total(), 2);
    assert_eq!(addrs.total(), 2);
    assert!(!addrs.add_visible());
    assert!(items.add_visible());
    assert_consistent(&doc, &items);
    assert_consistent(&doc, &addrs);

    // A delete link from one collection means nothing to the other.
    let addr_row = addrs.rows(&doc)[0];
    let link = delete_link(&doc, addr_row);
    let effect = items.remove(&mut doc, link).unwrap();
    assert!(!effect.changed());
    assert_eq!(addrs.total(), 2);
}

#[test]
fn prefix_boundaries_are_respected() {
    let markup = block_markup("item", 2, None).replace(
        r#"<textarea id="id_item-1-note""#,
        r#"<input id="id_line_item-1-x" name="line_item-1-x"><textarea id="id_item-1-note""#,
    );
    let (mut doc, mut formset) = setup(&markup, FormsetOptions::with_prefix("item"));
    let first = formset.rows(&doc)[0];
    let link = delete_link(&doc, first);
    formset.remove(&mut doc, link).unwrap();
    assert!(doc.element_by_id("id_item-0-note").is_some());
    let foreign = doc.element_by_id("id_line_item-1-x").unwrap();
    assert_eq!(doc.attr(foreign, "name"), Some("line_item-1-x"));
}

#[test]
fn hidden_initial_fields_follow_their_row() {
    let mut markup = block_markup("item", 3, None);
    for slot in ["0", "1", "2", "__prefix__"] {
        markup = markup.replace(
            &format!(r#"<textarea id="id_item-{slot}-note""#),
            &format!(
                r#"<input type="hidden" id="initial-id_item-{slot}-name" name="initial-item-{slot}-name"><textarea id="id_item-{slot}-note""#
            ),
        );
    }
    let (mut doc, mut formset) = setup(&markup, FormsetOptions::with_prefix("item"));
    let first = formset.rows(&doc)[0];
    let link = delete_link(&doc, first);
    formset.remove(&mut doc, link).unwrap();

    for index in 0..2 {
        let initial = doc
            .element_by_id(&format!("initial-id_item-{index}-name"))
            .unwrap_or_else(|| panic!("initial field of row {index} was not renumbered"));
        let expected = format!("initial-item-{index}-name");
        assert_eq!(doc.attr(initial, "name"), Some(expected.as_str()));
    }
    assert!(doc.element_by_id("initial-id_item-2-name").is_none());

    let added = formset.add(&mut doc).unwrap().added.unwrap();
    let fresh = doc.element_by_id("initial-id_item-2-name").unwrap();
    assert!(doc.ancestors(fresh).any(|a| a == added));
    assert_consistent(&doc, &formset);
}
