//! Java module sets shared by the unit and behaviour tests.

use relock_config::GuardedBlockPolicy;
use relock_syntax::Parser;

use crate::{RefactorPass, RenderedModule, SourceModule};

pub(super) const COUNTER: &str = "\
package demo;

public class Counter {
    private int count;
    private static int total;

    public synchronized void increment() {
        count++;
    }

    public static synchronized int total() {
        return total;
    }
}
";

pub(super) const PANEL: &str = "\
package ui;

public class Panel {
    private Widget component;

    public void draw() {
        synchronized (component) {
            component.paint();
        }
    }
}
";

pub(super) const WIDGET: &str = "\
package ui;

public class Widget {
    void paint() {
    }
}
";

pub(super) const BATCH: &str = "\
class Batch {
    void flush() {
        synchronized (this) {
            first();
            second();
        }
    }
}
";

pub(super) const BROKEN: &str = "\
class Broken {
    void f(Object monitor) {
        synchronized (monitor) {
            g();
        }
    }
}
";

/// Module sets addressed by name from feature files.
pub(super) fn named(name: &str) -> Vec<(&'static str, &'static str)> {
    match name {
        "counter" => vec![("Counter.java", COUNTER)],
        "widget" => vec![("Panel.java", PANEL), ("Widget.java", WIDGET)],
        "batch" => vec![("Batch.java", BATCH)],
        "broken" => vec![("Broken.java", BROKEN), ("Counter.java", COUNTER)],
        other => panic!("unknown fixture '{other}'"),
    }
}

pub(super) fn parse_modules<P: AsRef<str>, S: AsRef<str>>(sources: &[(P, S)]) -> Vec<SourceModule> {
    let mut parser = Parser::new().expect("parser init");
    sources
        .iter()
        .map(|(path, source)| {
            SourceModule::parse(&mut parser, path.as_ref(), source.as_ref().to_owned())
                .unwrap_or_else(|error| panic!("fixture {} should parse: {error}", path.as_ref()))
        })
        .collect()
}

/// Plans and renders `modules` without touching the filesystem.
pub(super) fn render(modules: &[SourceModule], policy: GuardedBlockPolicy) -> Vec<RenderedModule> {
    let pass = RefactorPass::new(policy).with_dry_run(true);
    let plan = pass.plan(modules);
    pass.render(modules, &plan)
}

/// Text of each module after rendering, falling back to the original.
pub(super) fn outputs(modules: &[SourceModule], rendered: &[RenderedModule]) -> Vec<(String, String)> {
    modules
        .iter()
        .zip(rendered)
        .map(|(module, result)| {
            let text = result
                .output
                .clone()
                .unwrap_or_else(|| module.source().to_owned());
            (module.path().display().to_string(), text)
        })
        .collect()
}
