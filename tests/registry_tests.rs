use multidump::dump::{self, AppContext, DumpContext, DumpValue, PRIMARY_SECTION, SECONDARY_SECTION};

#[test]
fn test_sections_keep_first_use_order() {
    let ctx = DumpContext::new();
    ctx.dump_in("zeta", 1);
    ctx.dump_in("alpha", 2);
    ctx.dump_in("zeta", 3);
    ctx.dump(4);

    let values = ctx.values();
    let names: Vec<&str> = values.section_names().collect();
    // the first dump seeds the primary column
    assert_eq!(names, vec![PRIMARY_SECTION, "zeta", "alpha", SECONDARY_SECTION]);

    let zeta: Vec<_> = values
        .section("zeta")
        .unwrap()
        .iter()
        .map(|e| e.value().to_json().unwrap())
        .collect();
    assert_eq!(zeta, vec![serde_json::json!(1), serde_json::json!(3)]);
}

#[test]
fn test_default_section_is_secondary() {
    let ctx = DumpContext::new();
    ctx.dump("x");
    let values = ctx.values();
    assert_eq!(values.section(SECONDARY_SECTION).map(<[_]>::len), Some(1));
    assert_eq!(values.section(PRIMARY_SECTION).map(<[_]>::len), Some(0));
}

#[test]
fn test_title_is_kept() {
    let ctx = DumpContext::new();
    ctx.dump_titled("s", "T", vec![1, 2]);
    let values = ctx.values();
    let entry = &values.section("s").unwrap()[0];
    assert_eq!(entry.title(), Some("T"));
    assert!(entry.source_file().unwrap().ends_with("registry_tests.rs"));
}

#[test]
fn test_reset_clears_values_and_callbacks() {
    let ctx = DumpContext::new();
    ctx.dump(1);
    ctx.extend(PRIMARY_SECTION, |_: &AppContext| String::new());
    ctx.reset();
    assert!(ctx.is_empty());
    assert!(ctx.callbacks().is_empty());
    assert_eq!(ctx.values().section_names().count(), 0);
}

#[test]
fn test_requests_do_not_share_entries() {
    let first = DumpContext::new();
    let second = DumpContext::new();
    {
        let _scope = dump::scope::enter(&first);
        dump::dump("first request");
    }
    {
        let _scope = dump::scope::enter(&second);
        dump::dump("second request");
        dump::dump("second request again");
    }
    assert_eq!(first.len(), 1);
    assert_eq!(second.len(), 2);
}

#[test]
fn test_contexts_on_separate_threads_are_isolated() {
    let handles: Vec<_> = (0..4)
        .map(|n| {
            std::thread::spawn(move || {
                let ctx = DumpContext::new();
                let _scope = dump::scope::enter(&ctx);
                for i in 0..=n {
                    dump::dump(i);
                }
                ctx.len()
            })
        })
        .collect();
    let counts: Vec<usize> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    assert_eq!(counts, vec![1, 2, 3, 4]);
}

#[test]
fn test_shared_context_across_threads() {
    let ctx = DumpContext::new();
    let worker = ctx.clone();
    std::thread::spawn(move || worker.dump_in("jobs", "from worker"))
        .join()
        .unwrap();
    assert_eq!(ctx.values().section("jobs").map(<[_]>::len), Some(1));
}
