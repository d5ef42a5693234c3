use super::*;

fn names(stack: &LayerStack) -> Vec<String> {
    stack.iter().map(|(_, l)| l.name.clone()).collect()
}

#[test]
fn new_stack_has_one_selected_layer() {
    let s = LayerStack::new();
    assert_eq!(s.len(), 1);
    assert_eq!(s.selected(), s.id_at(0));
    assert_eq!(names(&s), vec!["Layer 1"]);
}

#[test]
fn from_layers_selects_top_and_handles_empty() {
    let s = LayerStack::from_layers(vec![Layer::new("top"), Layer::new("bottom")]);
    assert_eq!(s.selected_layer().map(|l| l.name.as_str()), Some("top"));
    assert_eq!(LayerStack::from_layers(Vec::new()).len(), 1);
}

#[test]
fn last_layer_cannot_be_removed() {
    let mut s = LayerStack::new();
    let id = s.id_at(0).unwrap();
    assert!(s.remove(id).is_err());
    assert_eq!(s.len(), 1);
}

#[test]
fn removing_selected_layer_selects_neighbour() {
    let mut s = LayerStack::from_layers(vec![Layer::new("a"), Layer::new("b"), Layer::new("c")]);
    let b = s.id_at(1).unwrap();
    let c = s.id_at(2).unwrap();
    s.set_selected(Some(b)).unwrap();
    let (index, layer) = s.remove(b).unwrap();
    assert_eq!((index, layer.name.as_str()), (1, "b"));
    assert_eq!(s.selected(), Some(c));

    // Removing the bottom selected layer falls back to the top.
    s.remove(c).unwrap();
    assert_eq!(s.selected(), s.id_at(0));
}

#[test]
fn reinserting_with_same_id_restores_identity() {
    let mut s = LayerStack::from_layers(vec![Layer::new("a"), Layer::new("b")]);
    let b = s.id_at(1).unwrap();
    let (index, layer) = s.remove(b).unwrap();
    s.insert_with_id(index, b, layer).unwrap();
    assert_eq!(s.id_at(1), Some(b));
    assert!(s.insert_with_id(0, b, Layer::new("dup")).is_err());
    // Fresh ids never collide with restored ones.
    let fresh = s.insert(0, Layer::new("n")).unwrap();
    assert_ne!(fresh, b);
}

#[test]
fn move_validates_bounds() {
    let mut s = LayerStack::from_layers(vec![Layer::new("a"), Layer::new("b"), Layer::new("c")]);
    s.move_layer(0, 2).unwrap();
    assert_eq!(names(&s), vec!["b", "c", "a"]);
    assert!(s.move_layer(3, 0).is_err());
    assert!(s.move_layer(0, 3).is_err());
}

#[test]
fn selection_must_be_live() {
    let mut s = LayerStack::new();
    assert!(s.set_selected(Some(LayerId(99))).is_err());
    s.set_selected(None).unwrap();
    assert_eq!(s.selected_layer(), None);
}

#[test]
fn renumber_keeps_custom_names() {
    let mut s = LayerStack::from_layers(vec![
        Layer::new(""),
        Layer::new("ink"),
        Layer::new("Layer 7"),
        Layer::new("Layer x"),
    ]);
    s.renumber();
    assert_eq!(names(&s), vec!["Layer 4", "ink", "Layer 2", "Layer x"]);
}

#[test]
fn insert_rejects_out_of_range_index() {
    let mut s = LayerStack::new();
    assert!(s.insert(2, Layer::new("x")).is_err());
    s.insert(1, Layer::new("x")).unwrap();
    assert_eq!(s.snapshot().len(), 2);
}
