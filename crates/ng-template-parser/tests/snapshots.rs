use ng_template_parser::{parse, BindingValue, Expr, Node, TemplateAttr};

fn expr(e: &Expr) -> String {
    match e {
        Expr::Expression { source, .. } => source.clone(),
        Expr::Pipe {
            name, inner, args, ..
        } => {
            let mut out = format!("({} | {name}", expr(inner));
            for arg in args {
                out.push(':');
                out.push_str(arg);
            }
            out.push(')');
            out
        }
    }
}

fn value(v: &BindingValue) -> String {
    match v {
        BindingValue::Expr(e) => expr(e),
        BindingValue::Interpolation(i) => {
            let mut out = String::new();
            for (s, e) in i.strings.iter().zip(&i.expressions) {
                out.push_str(&format!("{s:?} {} ", expr(e)));
            }
            out.push_str(&format!("{:?}", i.strings.last().cloned().unwrap_or_default()));
            out
        }
    }
}

fn render(nodes: &[Node], depth: usize, out: &mut String) {
    let pad = "  ".repeat(depth);
    for node in nodes {
        match node {
            Node::Element(el) => {
                out.push_str(&format!("{pad}element {}\n", el.name));
                for a in &el.attributes {
                    out.push_str(&format!("{pad}  attr {}={:?}\n", a.name, a.value));
                }
                for i in &el.inputs {
                    out.push_str(&format!("{pad}  input {:?} {} = {}\n", i.kind, i.name, value(&i.value)));
                }
                for o in &el.outputs {
                    out.push_str(&format!("{pad}  output {} -> {}\n", o.name, o.handler));
                }
                render(&el.children, depth + 1, out);
            }
            Node::Template(t) => {
                out.push_str(&format!("{pad}template {}\n", t.tag_name));
                for attr in &t.template_attrs {
                    match attr {
                        TemplateAttr::Bound(b) => {
                            out.push_str(&format!("{pad}  bound {} = {}\n", b.name, value(&b.value)))
                        }
                        TemplateAttr::Text(a) => out.push_str(&format!("{pad}  text {}\n", a.name)),
                    }
                }
                for v in &t.variables {
                    out.push_str(&format!("{pad}  let {} = {}\n", v.name, v.value));
                }
                render(&t.children, depth + 1, out);
            }
            Node::Content(c) => out.push_str(&format!("{pad}content {}\n", c.selector)),
            Node::Text(t) if t.value.trim().is_empty() => {}
            Node::Text(t) => out.push_str(&format!("{pad}text {:?}\n", t.value)),
            Node::BoundText(t) => {
                out.push_str(&format!("{pad}bound-text {}\n", value(&BindingValue::Interpolation(t.value.clone()))))
            }
            Node::Icu(icu) => out.push_str(&format!("{pad}icu {} {}\n", icu.switch_value, icu.kind)),
        }
    }
}

fn parse_snapshot(source: &str) -> String {
    let result = parse(source);
    assert!(
        result.errors.is_empty(),
        "Expected no errors, got: {:?}",
        result.errors
    );
    let mut out = String::new();
    render(&result.nodes, 0, &mut out);
    out
}

#[test]
fn test_snapshot_bindings() {
    insta::assert_snapshot!(
        parse_snapshot(r#"<button class="btn" [disabled]="busy" [class.active]="on" (click)="save($event)">Save</button>"#),
        @r###"
    element button
      attr class="btn"
      input Property disabled = busy
      input Class active = on
      output click -> save($event)
      text "Save"
    "###
    );
}

#[test]
fn test_snapshot_ng_for_with_pipe() {
    insta::assert_snapshot!(
        parse_snapshot(r#"<li *ngFor="let item of items | keyvalue; index as i">{{ i }}: {{ item.key | uppercase }}</li>"#),
        @r###"
    template li
      text ngFor
      bound ngForOf = (items | keyvalue)
      let item = $implicit
      let i = index
      element li
        bound-text "" i ": " (item.key | uppercase) ""
    "###
    );
}

#[test]
fn test_snapshot_ng_switch() {
    insta::assert_snapshot!(
        parse_snapshot(
            r#"<div [ngSwitch]="mode">
    <span *ngSwitchCase="'a'">A</span>
    <span *ngSwitchDefault>other</span>
</div>"#
        ),
        @r###"
    element div
      input Property ngSwitch = mode
      template span
        bound ngSwitchCase = 'a'
        element span
          text "A"
      template span
        text ngSwitchDefault
        element span
          text "other"
    "###
    );
}

#[test]
fn test_snapshot_implied_end_tags_and_svg() {
    insta::assert_snapshot!(
        parse_snapshot(r#"<ul><li>one<li>two</ul><svg><circle r="2"/></svg>"#),
        @r###"
    element ul
      element li
        text "one"
      element li
        text "two"
    element :svg:svg
      element :svg:circle
        attr r="2"
    "###
    );
}

#[test]
fn test_snapshot_interpolated_attribute() {
    insta::assert_snapshot!(
        parse_snapshot(r#"<img src="/img/{{ id }}.png" alt="x">"#),
        @r###"
    element img
      attr alt="x"
      input Property src = "/img/" id ".png"
    "###
    );
}
