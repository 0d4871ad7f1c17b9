use std::time::Duration;

use console::Style;
use loupe_core::engine::{DebugSnapshot, ViewportEngine};

struct Styles {
    title: Style,
    header: Style,
    label: Style,
    value: Style,
    method: Style,
    disabled: Style,
}

impl Styles {
    fn new() -> Self {
        Self {
            title: Style::new().cyan().bold(),
            header: Style::new().cyan().bold(),
            label: Style::new().dim(),
            value: Style::new().bold().white(),
            method: Style::new().green(),
            disabled: Style::new().dim().yellow(),
        }
    }
}

fn print_title(s: &Styles, title: &str) {
    println!();
    println!("  {}", s.title.apply_to(title));
    println!("  {}", s.title.apply_to("\u{2550}".repeat(title.chars().count())));
    println!();
}

pub fn print_render_summary(engine: &ViewportEngine, elapsed: Duration) {
    let s = Styles::new();
    print_title(&s, "Loupe Render");

    println!(
        "  {:<14}{}",
        s.label.apply_to("Viewport"),
        s.value.apply_to(engine.viewport())
    );
    println!(
        "  {:<14}{}",
        s.label.apply_to("Resampler"),
        s.method.apply_to(engine.resampler_name())
    );
    println!();

    if let Some(state) = engine.transform() {
        println!("  {}", s.header.apply_to("Transform"));
        println!(
            "    {:<12}{}",
            s.label.apply_to("Content"),
            s.value.apply_to(state.content())
        );
        println!(
            "    {:<12}{}",
            s.label.apply_to("Scale"),
            s.value.apply_to(format!("{:.4}x", state.scale()))
        );
        println!(
            "    {:<12}{}",
            s.label.apply_to("Origin"),
            s.value.apply_to(format!("({:.2}, {:.2})", state.origin().x, state.origin().y))
        );
        println!();
    }

    println!("  {}", s.header.apply_to("Frame"));
    match engine.frame_info() {
        Some(info) => {
            println!(
                "    {:<12}{}",
                s.label.apply_to("Quality"),
                s.method.apply_to(info.quality)
            );
            match info.kernel {
                Some(kernel) => println!(
                    "    {:<12}{}",
                    s.label.apply_to("Kernel"),
                    s.method.apply_to(kernel)
                ),
                None => println!(
                    "    {:<12}{}",
                    s.label.apply_to("Kernel"),
                    s.disabled.apply_to("background only")
                ),
            }
            println!(
                "    {:<12}{}",
                s.label.apply_to("Generation"),
                s.value.apply_to(info.generation)
            );
        }
        None => println!(
            "    {:<12}{}",
            s.label.apply_to("Quality"),
            s.disabled.apply_to("not rendered")
        ),
    }
    println!(
        "    {:<12}{}",
        s.label.apply_to("Time"),
        s.value.apply_to(format!("{:.1} ms", elapsed.as_secs_f64() * 1000.0))
    );
    println!();
}

pub fn print_probe_summary(snap: &DebugSnapshot) {
    let s = Styles::new();
    print_title(&s, "Loupe Probe");

    match snap.cursor {
        Some(c) => println!(
            "  {:<14}{}",
            s.label.apply_to("Screen"),
            s.value.apply_to(format!("({:.1}, {:.1})", c.x, c.y))
        ),
        None => println!(
            "  {:<14}{}",
            s.label.apply_to("Screen"),
            s.disabled.apply_to("outside viewport")
        ),
    }
    if let Some(c) = snap.cursor_content_coord {
        println!(
            "  {:<14}{}",
            s.label.apply_to("Content"),
            s.value.apply_to(format!("({:.2}, {:.2})", c.x, c.y))
        );
    }
    println!(
        "  {:<14}{}",
        s.label.apply_to("Scale"),
        s.value.apply_to(format!("{:.4}x", snap.scale))
    );
    match snap.pixel_color_under_cursor {
        Some(color) => println!(
            "  {:<14}{} {}",
            s.label.apply_to("Pixel"),
            s.method.apply_to(color.hex()),
            s.label.apply_to(format!("alpha {}", color.a()))
        ),
        None => println!(
            "  {:<14}{}",
            s.label.apply_to("Pixel"),
            s.disabled.apply_to("off image")
        ),
    }
    println!();
}
