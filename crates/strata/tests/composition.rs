//! End-to-end composition tests against template trees on disk.

use std::fs;
use std::io::Write;
use std::path::Path;

use serde::Serialize;
use serde_json::json;
use strata::{
    BuildError, CollisionPolicy, Config, DirTree, ExecuteError, MemoryTree, Registry, Templates,
};
use tempfile::TempDir;

fn create_file(dir: &Path, relative_path: &str, content: &str) {
    let full_path = dir.join(relative_path);
    if let Some(parent) = full_path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    let mut file = fs::File::create(&full_path).unwrap();
    file.write_all(content.as_bytes()).unwrap();
}

/// The tree used by most tests:
///
/// ```text
/// templates/
///   layout.html
///   includes/{header,footer,item}.html
///   profile/
///     layout.html
///     view.html
///     edit.html
///     payments/
///       layout.html
///       includes/item.html
///       methods.html
/// ```
fn fixture() -> TempDir {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path();
    create_file(
        root,
        "templates/layout.html",
        "{% include \"header.html\" %} layout {% block content %}{% endblock %}{% include \"footer.html\" %}",
    );
    create_file(root, "templates/includes/header.html", "header");
    create_file(root, "templates/includes/footer.html", "footer");
    create_file(root, "templates/includes/item.html", "item");
    create_file(
        root,
        "templates/profile/layout.html",
        "{% block content %}profile {% block body %}{% endblock %}{% endblock %}",
    );
    create_file(
        root,
        "templates/profile/view.html",
        "{% block body %}view {{ title }}{% endblock %}",
    );
    create_file(
        root,
        "templates/profile/edit.html",
        "{% block body %}edit {{ title }}{% endblock %}",
    );
    create_file(
        root,
        "templates/profile/payments/layout.html",
        "{% block body %}payments_layout {% block methods %}{% endblock %}{% endblock %}",
    );
    create_file(
        root,
        "templates/profile/payments/includes/item.html",
        "method",
    );
    create_file(
        root,
        "templates/profile/payments/methods.html",
        "{% block methods %}methods {% include \"item.html\" %} {% endblock %}",
    );
    temp_dir
}

fn build(temp_dir: &TempDir) -> Registry {
    Registry::build(&DirTree::new(temp_dir.path()), "templates", &Config::default()).unwrap()
}

#[derive(Serialize)]
struct Params {
    title: String,
}

fn params() -> Params {
    Params {
        title: "testdata".into(),
    }
}

#[test]
fn test_identifiers_cover_leaves_only() {
    let temp_dir = fixture();
    let registry = build(&temp_dir);
    assert_eq!(
        registry.names(),
        vec!["profile/edit", "profile/payments/methods", "profile/view"]
    );
}

#[test]
fn test_nested_layouts_apply_shallow_to_deep() {
    let temp_dir = fixture();
    let registry = build(&temp_dir);

    assert_eq!(
        registry.render("profile/view", &params()).unwrap(),
        "header layout profile view testdatafooter"
    );
    assert_eq!(
        registry.render("profile/edit", &params()).unwrap(),
        "header layout profile edit testdatafooter"
    );
}

#[test]
fn test_three_layout_levels_and_deeper_partial() {
    let temp_dir = fixture();
    let registry = build(&temp_dir);

    assert_eq!(
        registry
            .render("profile/payments/methods", &params())
            .unwrap(),
        "header layout profile payments_layout methods method footer"
    );
}

#[test]
fn test_shallow_partial_used_outside_deeper_scope() {
    let temp_dir = fixture();
    create_file(
        temp_dir.path(),
        "templates/profile/list.html",
        "{% block body %}{% include \"item.html\" %}{% endblock %}",
    );
    let registry = build(&temp_dir);
    assert_eq!(
        registry.render("profile/list", &params()).unwrap(),
        "header layout profile itemfooter"
    );
}

#[test]
fn test_scenario_single_layout_with_includes() {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path();
    create_file(
        root,
        "t/layout.html",
        "{% include \"header.html\" %} {% block content %}{% endblock %} {% include \"footer.html\" %}",
    );
    create_file(root, "t/includes/header.html", "header");
    create_file(root, "t/includes/footer.html", "footer");
    create_file(root, "t/profile/view.html", "{% block content %}view{% endblock %}");

    let registry = Registry::build(&DirTree::new(root), "t", &Config::default()).unwrap();
    let mut out = Vec::new();
    registry.execute("profile/view", &mut out, &json!({})).unwrap();
    assert_eq!(String::from_utf8(out).unwrap(), "header view footer");
}

#[test]
fn test_scenario_nested_layout_override_wins() {
    let tree = MemoryTree::from_entries(&[
        ("t/layout.html", "[{% block title %}root{% endblock %}]"),
        ("t/profile/layout.html", "{% block title %}profile{% endblock %}"),
        ("t/profile/edit.html", ""),
    ]);
    let registry = Registry::build(&tree, "t", &Config::default()).unwrap();
    assert_eq!(registry.render("profile/edit", &json!({})).unwrap(), "[profile]");
}

#[test]
fn test_scenario_colliding_identifiers_last_wins() {
    let temp_dir = TempDir::new().unwrap();
    create_file(temp_dir.path(), "t/profile/view.html", "from html");
    create_file(temp_dir.path(), "t/profile/view.tmpl", "from tmpl");

    let tree = DirTree::new(temp_dir.path());
    let registry = Registry::build(&tree, "t", &Config::default()).unwrap();
    assert_eq!(registry.len(), 1);
    assert_eq!(
        registry.render("profile/view", &json!({})).unwrap(),
        "from tmpl"
    );

    let strict = Config::new().collisions(CollisionPolicy::Reject);
    let err = Registry::build(&tree, "t", &strict).unwrap_err();
    assert!(matches!(err, BuildError::Collision { .. }));
}

#[test]
fn test_include_members_are_not_addressable() {
    let temp_dir = fixture();
    let registry = build(&temp_dir);

    for name in ["includes/header", "header", "profile/payments/includes/item"] {
        let err = registry.render(name, &params()).unwrap_err();
        assert!(err.is_not_found(), "{name} should not be addressable");
    }
}

#[test]
fn test_layouts_are_not_addressable() {
    let temp_dir = fixture();
    let registry = build(&temp_dir);
    assert!(!registry.contains("layout"));
    assert!(!registry.contains("profile/layout"));
}

#[test]
fn test_rebuild_renders_identically() {
    let temp_dir = fixture();
    let first = build(&temp_dir);
    let second = build(&temp_dir);

    assert_eq!(first.names(), second.names());
    for name in first.names() {
        assert_eq!(
            first.render(name, &params()).unwrap(),
            second.render(name, &params()).unwrap()
        );
    }
}

#[test]
fn test_not_found_leaves_sink_empty() {
    let temp_dir = fixture();
    let registry = build(&temp_dir);

    let mut out = Vec::new();
    let err = registry
        .execute("profile/missing", &mut out, &params())
        .unwrap_err();
    assert!(matches!(err, ExecuteError::NotFound { ref name } if name == "profile/missing"));
    assert!(out.is_empty());
}

#[test]
fn test_render_failure_is_distinct_from_not_found() {
    let temp_dir = TempDir::new().unwrap();
    create_file(
        temp_dir.path(),
        "t/strict.html",
        "{{ title|length }}",
    );
    let registry =
        Registry::build(&DirTree::new(temp_dir.path()), "t", &Config::default()).unwrap();

    let err = registry.render("strict", &json!({ "title": 5 })).unwrap_err();
    assert!(matches!(err, ExecuteError::Render { ref name, .. } if name == "strict"));
    assert!(!err.is_not_found());
}

#[test]
fn test_compile_failure_aborts_build() {
    let temp_dir = fixture();
    create_file(temp_dir.path(), "templates/broken.html", "{% block %}");

    let err = Registry::build(&DirTree::new(temp_dir.path()), "templates", &Config::default())
        .unwrap_err();
    match err {
        BuildError::Compile { paths, .. } => {
            assert!(paths.iter().any(|p| p.ends_with("broken.html")));
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_missing_root_is_discovery_error() {
    let temp_dir = TempDir::new().unwrap();
    let err = Registry::build(&DirTree::new(temp_dir.path()), "nope", &Config::default())
        .unwrap_err();
    assert!(matches!(err, BuildError::Discovery { ref path, .. } if path == Path::new("nope")));
}

#[test]
fn test_file_root_is_discovery_error() {
    let temp_dir = TempDir::new().unwrap();
    create_file(temp_dir.path(), "t/view.html", "view");
    let err = Registry::build(&DirTree::new(temp_dir.path()), "t/view.html", &Config::default())
        .unwrap_err();
    assert!(
        matches!(err, BuildError::Discovery { ref path, .. } if path == Path::new("t/view.html"))
    );
}

#[cfg(unix)]
#[test]
fn test_unreadable_subdirectory_entry_is_named() {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path();
    create_file(root, "t/layout.html", "{% block content %}{% endblock %}");
    fs::create_dir_all(root.join("t/profile")).unwrap();
    std::os::unix::fs::symlink("broken", root.join("t/profile/broken")).unwrap();

    let err = Registry::build(&DirTree::new(root), "t", &Config::default()).unwrap_err();
    match err {
        BuildError::Discovery { path, .. } => assert_eq!(path, Path::new("t/profile/broken")),
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_custom_names_and_functions() {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path();
    create_file(root, "site/base.j2", "<{% block main %}{% endblock %}>");
    create_file(root, "site/partials/sig.j2", "-- {{ uppercase(author) }}");
    create_file(
        root,
        "site/post.j2",
        "{% block main %}post {% include \"sig.j2\" %}{% endblock %}",
    );

    let config = Config::new()
        .layout_filename("base.j2")
        .include_dir_name("partials")
        .function("uppercase", |s: String| s.to_uppercase());
    let registry = Registry::build(&DirTree::new(root), "site", &config).unwrap();

    assert_eq!(registry.names(), vec!["post"]);
    assert_eq!(
        registry.render("post", &json!({ "author": "doe" })).unwrap(),
        "<post -- DOE>"
    );
}

#[test]
fn test_concurrent_execution() {
    let temp_dir = fixture();
    let registry = build(&temp_dir);

    std::thread::scope(|scope| {
        let handles: Vec<_> = (0..8)
            .map(|i| {
                let registry = &registry;
                scope.spawn(move || {
                    let title = format!("t{i}");
                    registry
                        .render("profile/view", &json!({ "title": title }))
                        .unwrap()
                })
            })
            .collect();

        for (i, handle) in handles.into_iter().enumerate() {
            assert_eq!(
                handle.join().unwrap(),
                format!("header layout profile view t{i}footer")
            );
        }
    });
}

#[test]
fn test_templates_parse_tree_from_disk() {
    let temp_dir = fixture();
    let mut templates = Templates::new();
    templates
        .parse_tree(&DirTree::new(temp_dir.path()), "templates")
        .unwrap();
    assert_eq!(
        templates.render("profile/view", &params()).unwrap(),
        "header layout profile view testdatafooter"
    );
}
