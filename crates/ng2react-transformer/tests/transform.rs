//! Component file conversion tests.

use camino::Utf8Path;
use ng2react_transformer::{
    find_components, transform_component_file, ComponentRegistry, DiagnosticCode,
    InMemoryTemplateProvider, PolicyRegistry, TransformError, TransformOptions, TransformOutput,
    TransformResult,
};
use pretty_assertions::assert_eq;

const FILE: &str = "src/app/foo.component.ts";

fn try_transform_with(
    source: &str,
    registry: &ComponentRegistry,
    provider: &InMemoryTemplateProvider,
) -> TransformResult<TransformOutput> {
    let policy = PolicyRegistry::default();
    let options = TransformOptions {
        file: Utf8Path::new(FILE),
        src_root: Utf8Path::new("src"),
        registry,
        policy: &policy,
        provider,
    };
    transform_component_file(source, &options)
}

fn try_transform(source: &str) -> TransformResult<TransformOutput> {
    try_transform_with(source, &ComponentRegistry::new(), &InMemoryTemplateProvider::new())
}

fn transform(source: &str) -> String {
    try_transform(source)
        .unwrap_or_else(|err| panic!("transform failed: {err}"))
        .code
}

fn normalize(code: &str) -> String {
    code.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Compares code with all whitespace runs collapsed.
fn assert_code(actual: &str, expected: &str) {
    assert_eq!(normalize(actual), normalize(expected));
}

// ============================================================================
// SCANNING
// ============================================================================

#[test]
fn test_scan_components() {
    let source = "
    @Component({selector: 'foo-bar'})
    export class FooBarComponent { }
    ";
    let records = find_components(source, Utf8Path::new("foo.ts")).unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].origin_file, "foo.ts");
    assert_eq!(records[0].selector, "foo-bar");
    assert_eq!(records[0].exported_name, "FooBarComponent");
}

// ============================================================================
// CLASS TO FUNCTION
// ============================================================================

#[test]
fn test_empty_component() {
    let result = transform(
        "
    @Component({selector: 'foo-bar'})
    export class FooBarComponent { }
    ",
    );
    assert_code(
        &result,
        "
    import React from 'react';
    export function FooBarComponent() {
        return ();
    }",
    );
}

#[test]
fn test_getter_named_state_renames_state() {
    let result = transform(
        "
    @Component({selector: 'foo-bar'})
    export class FooBarComponent {
        statevar = 42;
        get state() { return 27; }
    }
    ",
    );
    assert_code(
        &result,
        "
    import React from 'react';
    export function FooBarComponent() {
        const [$state, setState] = React.useState(()=>{
            const initialState = { statevar: 42 };
            return initialState;
        });
        const { statevar } = $state;
        const state = 27;
        return ();
    }",
    );
}

#[test]
fn test_multiline_getter() {
    let result = transform(
        "
    @Component({selector: 'foo-bar'})
    export class FooBarComponent {
        get foo(): number {
            const baz = 27;
            return baz;
        }
    }
    ",
    );
    assert_code(
        &result,
        "
    import React from 'react';
    export function FooBarComponent() {
        const foo /* getter transformed to immediately invoked function */ = (() => {
            const baz = 27;
            return baz;
        })();
        return ();
    }",
    );
}

#[test]
fn test_input_with_default_is_optional_prop() {
    let result = transform(
        "
    @Component({selector: 'foo-bar'})
    export class FooBarComponent {
        @Input() width = 16;
    }
    ",
    );
    assert_code(
        &result,
        "
    import React from 'react';
    export function FooBarComponent({ width = 16 }: { width?: number }) {
        return ();
    }",
    );
}

#[test]
fn test_output_is_callback_prop() {
    let result = transform(
        "
    @Component({selector: 'foo-bar'})
    export class FooBarComponent {
        @Output() zap = new EventEmitter<number>();
    }
    ",
    );
    assert_code(
        &result,
        "
    import React from 'react';
    export function FooBarComponent({ zap }: { zap: (x: number) => void }) {
        return ();
    }",
    );
}

#[test]
fn test_long_props_go_on_separate_lines() {
    let result = transform(
        "
    @Component({selector: 'foo-bar'})
    export class FooBarComponent {
        @Input() hero: Hero;
        @Input() size = 16;
    }
    ",
    );
    assert!(
        result.contains(
            "export function FooBarComponent({ hero, size = 16 }: {\n\t\thero: Hero;\n\t\tsize?: number\n\t\t}) {"
        ),
        "{result}"
    );
}

#[test]
fn test_readonly_field_is_const() {
    let result = transform(
        "
    @Component({selector: 'foo-bar'})
    export class FooBarComponent {
        readonly width = 16;
    }
    ",
    );
    assert_code(
        &result,
        "
    import React from 'react';
    export function FooBarComponent() {
        const width = 16;
        return ();
    }",
    );
}

#[test]
fn test_constructor_body_is_inlined_in_state_initializer() {
    let result = transform(
        "
    @Component({selector: 'foo-bar'})
    export class FooBarComponent {
        baz!: number;
        constructor() {
            this.baz = 27;
        }
    }
    ",
    );
    assert_code(
        &result,
        "
    import React from 'react';
    export function FooBarComponent() {
        const [state, setState] = React.useState(()=>{
            const initialState = { baz: undefined as number };
            /* inlined constructor body */
            { initialState.baz = 27; }
            return initialState; });
        const { baz } = state;
        return ();
    }",
    );
}

#[test]
fn test_ng_on_init_is_inlined_in_state_initializer() {
    let result = transform(
        "
    @Component({selector: 'foo-bar'})
    export class FooBarComponent {
        baz!: number;
        ngOnInit() {
            this.baz = 27;
        }
    }
    ",
    );
    assert_code(
        &result,
        "
    import React from 'react';
    export function FooBarComponent() {
        const [state, setState] = React.useState(()=>{
            const initialState = { baz: undefined as number };
            /* inlined ngOnInit */
            { initialState.baz = 27; }
            return initialState; });
        const { baz } = state;
        return ();
    }",
    );
}

#[test]
fn test_ng_on_init_without_state_runs_on_mount() {
    let result = transform(
        "
    @Component({selector: 'foo-bar'})
    export class FooBarComponent {
        ngOnInit() {
            console.log('ready');
        }
    }
    ",
    );
    assert_code(
        &result,
        "
    import React from 'react';
    export function FooBarComponent() {
        /* inlined ngOnInit */
        React.useEffect(() => { console.log('ready'); }, []);
        return ();
    }",
    );
}

#[test]
fn test_ng_on_destroy_is_cleanup_effect() {
    let result = transform(
        "
    @Component({selector: 'foo-bar'})
    export class FooBarComponent {
        readonly sub = subscribe();
        ngOnDestroy() {
            this.sub.unsubscribe();
        }
    }
    ",
    );
    assert_code(
        &result,
        "
    import React from 'react';
    export function FooBarComponent() {
        const sub = subscribe();
        React.useEffect(() => () => { sub.unsubscribe(); }, []);
        return ();
    }",
    );
}

#[test]
fn test_state_assignment_becomes_set_state() {
    let result = transform(
        "
    @Component({selector: 'foo-bar'})
    export class FooBarComponent {
        baz = 17;
        foo() {
            this.baz = 27;
        }
    }
    ",
    );
    assert_code(
        &result,
        "
    import React from 'react';
    export function FooBarComponent() {
        const [state, setState] = React.useState(()=>{
            const initialState = { baz: 17 };
            return initialState;
        });
        const { baz } = state;
        function foo() {
            setState({...state, baz: 27});
        }
        return ();
    }",
    );
}

#[test]
fn test_method_bodies_are_rewritten() {
    let result = transform(
        "
    @Component({selector: 'foo-bar'})
    export class FooBarComponent {
        count = 0;
        items: Hero[] = [];
        // Loads everything.
        async load() {
            this.items = <Hero[]>await fetchAll(this.count);
        }
        *ids() {
            yield this.count;
        }
        bump(step: number): void {
            this.count += step;
        }
    }
    ",
    );
    assert_code(
        &result,
        "
    import React from 'react';
    export function FooBarComponent() {
        const [state, setState] = React.useState(()=>{
            const initialState = {
                count: 0,
                items: []
            };
            return initialState;
        });
        const { count, items } = state;
        // Loads everything.
        async function load() {
            setState({...state, items: ((await fetchAll(count)) as Hero[])});
        }
        function* ids() {
            yield count;
        }
        function bump(step: number): void {
            setState({...state, count: count + step});
        }
        return ();
    }",
    );
}

#[test]
fn test_compound_assignment_with_operator_expression() {
    let result = transform(
        "
    @Component({selector: 'foo-bar'})
    export class FooBarComponent {
        n = 1;
        scale(a: number, b: number) {
            this.n *= a + b;
            this.n -= this.n > 10 ? 1 : 0;
        }
    }
    ",
    );
    assert!(normalize(&result).contains("setState({...state, n: n * (a + b)});"));
    assert!(normalize(&result).contains("setState({...state, n: n - (n > 10 ? 1 : 0)});"));
}

#[test]
fn test_setters() {
    let result = transform(
        "
    @Component({selector: 'foo-bar'})
    export class FooBarComponent {
        current = '';
        @Input() set color(value: string) {
            console.log(value);
        }
        set mode(m: string) {
            this.current = m;
        }
    }
    ",
    );
    assert_code(
        &result,
        "
    import React from 'react';
    export function FooBarComponent({ color }: { color: string }) {
        const [state, setState] = React.useState(()=>{
            const initialState = { current: '' };
            return initialState;
        });
        const { current } = state;
        /* inlined setter for color */ ((value: string) => {
            console.log(value);
        })(color);
        /* inlined setter end */
        function set_mode(m: string) {
            setState({...state, current: m});
        }
        return ();
    }",
    );
}

#[test]
fn test_constructor_injections() {
    let result = transform(
        "
    @Component({selector: 'foo-bar'})
    export class FooBarComponent {
        constructor(private heroService: HeroService, el: ElementRef) {}
    }
    ",
    );
    assert_code(
        &result,
        "
    import React from 'react';
    export function FooBarComponent() {
        const heroService = React.useContext(HeroService);
        const el = React.createRef();
        return ();
    }",
    );
}

#[test]
fn test_untyped_injection_fails() {
    let err = try_transform(
        "
    @Component({selector: 'foo-bar'})
    export class FooBarComponent {
        constructor(private service) {}
    }
    ",
    )
    .unwrap_err();
    assert!(matches!(err, TransformError::Configuration(_)), "{err}");
}

#[test]
fn test_private_members_are_not_supported() {
    let err = try_transform(
        "
    @Component({selector: 'foo-bar'})
    export class FooBarComponent {
        #secret = 1;
    }
    ",
    )
    .unwrap_err();
    assert!(matches!(err, TransformError::NotSupported(_)), "{err}");
}

#[test]
fn test_missing_selector_fails() {
    let err = try_transform("@Component({template: ''}) export class A {}").unwrap_err();
    assert!(matches!(err, TransformError::Configuration(_)), "{err}");
}

#[test]
fn test_syntax_error_is_reported_with_position() {
    let err = try_transform("@Component({selector: 'a'})\nexport class A {\n  x = ;\n}").unwrap_err();
    match err {
        TransformError::Script { file, line, .. } => {
            assert_eq!(file, FILE);
            assert_eq!(line, 3);
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_dropped_decorators_are_reported() {
    let output = try_transform(
        "
    @Component({selector: 'foo-bar'})
    export class FooBarComponent {
        @HostListener('click') onClick() {}
    }
    ",
    )
    .unwrap();
    assert_eq!(output.diagnostics.len(), 1);
    assert_eq!(output.diagnostics[0].code, DiagnosticCode::DroppedDecorator);
    assert!(output.code.contains("function onClick() {}"), "{}", output.code);
}

// ============================================================================
// FILE LEVEL
// ============================================================================

#[test]
fn test_angular_imports_are_removed() {
    let result = transform(
        "
    import { Component } from '@angular/core';
    import { SomethingUseful } from '.baz';

    @Component({selector: 'foo-bar'})
    export class FooBarComponent { }
    ",
    );
    assert_code(
        &result,
        "
    import React from 'react';
    import { SomethingUseful } from '.baz';
    export function FooBarComponent() {
        return ();
    }",
    );
}

#[test]
fn test_file_without_components_is_verbatim() {
    let source = "
    import { Injectable } from '@angular/core';

    @Injectable()
    export class HeroService {
        heroes = [];
    }
    ";
    assert_eq!(transform(source), source);
}

#[test]
fn test_other_code_is_kept() {
    let result = transform(
        "
    const LIMIT = 3;

    @Component({selector: 'foo-bar'})
    export default class FooBarComponent { }

    export class Helper {
        run() { return this.value; }
    }
    ",
    );
    assert_code(
        &result,
        "
    import React from 'react';
    const LIMIT = 3;
    export default function FooBarComponent() {
        return ();
    }
    export class Helper {
        run() { return this.value; }
    }",
    );
}

#[test]
fn test_inline_template() {
    let result = transform(
        r#"
    @Component({selector: 'foo-bar', template: `<button (click)="inc()">{{ count }}</button>`})
    export class FooBarComponent {
        count = 0;
        inc() { this.count = this.count + 1; }
    }
    "#,
    );
    assert_code(
        &result,
        "
    import React from 'react';
    export function FooBarComponent() {
        const [state, setState] = React.useState(()=>{
            const initialState = { count: 0 };
            return initialState;
        });
        const { count } = state;
        function inc() { setState({...state, count: count + 1}); }
        return (<button onClick={()=>inc()}>{count}</button>);
    }",
    );
}

#[test]
fn test_template_url_and_imports() {
    let registry: ComponentRegistry = find_components(
        "@Component({selector: 'app-hero', template: ''}) export class HeroComponent {}",
        Utf8Path::new("src/app/hero/hero.component.ts"),
    )
    .unwrap()
    .into_iter()
    .collect();
    let mut provider = InMemoryTemplateProvider::new();
    provider.insert(
        "src/app/foo.component.html",
        r#"<div><app-hero [hero]="a"></app-hero><app-hero [hero]="b"></app-hero>{{ a.name | uppercase }}</div>"#,
    );

    let output = try_transform_with(
        "
    import { Component } from '@angular/core';

    @Component({
        selector: 'foo-bar',
        templateUrl: './foo.component.html',
        styleUrls: ['./foo.component.css'],
    })
    export class FooBarComponent {
        @Input() a: Hero;
        @Input() b: Hero;
    }
    ",
        &registry,
        &provider,
    )
    .unwrap();

    assert_code(
        &output.code,
        "
    import React from 'react';
    import {HeroComponent} from './hero/hero.component';
    import './foo.component.css';
    import {uppercase} from '../pipes';
    export function FooBarComponent({ a, b }: { a: Hero; b: Hero }) {
        return (<div><HeroComponent hero={a} /><HeroComponent hero={b} />{uppercase(a.name)}</div>);
    }",
    );
    assert!(output.diagnostics.is_empty());
}

#[test]
fn test_missing_template_file() {
    let err = try_transform(
        "@Component({selector: 'a', templateUrl: './missing.html'}) export class A {}",
    )
    .unwrap_err();
    match err {
        TransformError::TemplateLoad { path, .. } => assert_eq!(path, "src/app/missing.html"),
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_inline_template_errors_name_the_component_file() {
    let err = try_transform(
        "@Component({selector: 'a', template: '<p>\\n</q>'}) export class A {}",
    )
    .unwrap_err();
    match err {
        TransformError::Parse(errors) => {
            assert_eq!(errors[0].file, FILE);
            assert_eq!(errors[0].line, 2);
        }
        other => panic!("unexpected error: {other}"),
    }
}
