//! The prelude alone is enough for a small embedding.

use vellum::prelude::*;

#[test]
fn prelude_covers_a_session() {
    let dir = tempfile::tempdir().unwrap();

    let mut doc = Document::new();
    let root = doc.root();
    let main = doc.create_element("main");
    doc.append(root, main);
    let tpl = doc.create_element("template");
    doc.set_attr(tpl, "data-type", "home");
    let label = doc.create_element("span");
    doc.set_attr(label, "data-view", "user.name");
    doc.append(tpl, label);
    doc.append(root, tpl);

    let mut engine = Engine::new(doc).with_storage(FileStorage::new(dir.path()));
    engine.load();
    assert!(page::goto(&mut engine, "home"));
    engine.edit("user.name", json!("Ann"));

    let doc = engine.document();
    let shown = doc.children(
        doc.all_elements()
            .into_iter()
            .find(|&id| doc.tag(id) == "main")
            .unwrap(),
    )[0];
    assert_eq!(doc.text(shown), "Ann");
}
