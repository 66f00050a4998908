use console::Style;
use skystack_core::pipeline::config::PipelineConfig;
use skystack_core::pipeline::PreparedField;
use skystack_core::stack::StackMethod;

struct Styles {
    title: Style,
    header: Style,
    label: Style,
    value: Style,
    method: Style,
    path: Style,
}

impl Styles {
    fn new() -> Self {
        Self {
            title: Style::new().cyan().bold(),
            header: Style::new().cyan().bold(),
            label: Style::new().dim(),
            value: Style::new().bold().white(),
            method: Style::new().green(),
            path: Style::new().underlined(),
        }
    }
}

pub fn print_pipeline_summary(config: &PipelineConfig) {
    let s = Styles::new();

    println!();
    println!("  {}", s.title.apply_to("Skystack Pipeline"));
    println!("  {}", s.title.apply_to("\u{2550}".repeat(17)));
    println!();

    println!(
        "  {:<14}{}",
        s.label.apply_to("Frames"),
        s.value.apply_to(config.inputs.len())
    );
    if let Some(first) = config.inputs.first() {
        println!(
            "  {:<14}{}",
            s.label.apply_to("Reference"),
            s.path.apply_to(first.display())
        );
    }
    println!(
        "  {:<14}{}",
        s.label.apply_to("Output"),
        s.path.apply_to(config.output_dir.display())
    );
    println!();

    println!("  {}", s.header.apply_to("Registration"));
    println!(
        "    {:<12}{}",
        s.label.apply_to("Tolerance"),
        s.value.apply_to(format!("{} px", config.registration.match_tolerance))
    );
    println!(
        "    {:<12}{}",
        s.label.apply_to("Min shift"),
        s.value.apply_to(format!("{} px", config.registration.min_shift))
    );
    println!(
        "    {:<12}{}",
        s.label.apply_to("Stack"),
        s.method.apply_to(&config.registration.stacking)
    );
    if let StackMethod::SigmaClippedMedian(params) = &config.registration.stacking {
        println!(
            "    {:<12}{}",
            s.label.apply_to("Clip"),
            s.value.apply_to(format!(
                "-{} / +{} sigma, {} pass(es)",
                params.low_sigma, params.high_sigma, params.iterations
            ))
        );
    }
    println!();

    println!("  {}", s.header.apply_to("Selection"));
    println!(
        "    {:<12}{}",
        s.label.apply_to("Cutout"),
        s.value.apply_to(format!("{} px", config.selection.cutout_size))
    );
    println!(
        "    {:<12}{}",
        s.label.apply_to("Crowding"),
        s.value
            .apply_to(format!("{} x FWHM", config.selection.crowding_fwhm_factor))
    );
    println!(
        "    {:<12}{}",
        s.label.apply_to("Peak"),
        s.value
            .apply_to(format!("> {} sigma", config.selection.significance_sigma))
    );
    println!();
}

pub fn print_field_summary(field: &PreparedField) {
    let s = Styles::new();

    println!();
    println!("  {}", s.header.apply_to("Result"));
    println!(
        "    {:<12}{}",
        s.label.apply_to("FWHM"),
        s.value.apply_to(format!("{:.2} px", field.fwhm.fwhm))
    );
    println!(
        "    {:<12}{}",
        s.label.apply_to("Background"),
        s.value.apply_to(format!(
            "{:.1} \u{00b1} {:.1}",
            field.background.median, field.background.stddev
        ))
    );
    let report = &field.selection;
    println!(
        "    {:<12}{}",
        s.label.apply_to("Detected"),
        s.value.apply_to(report.detected)
    );
    println!(
        "    {:<12}{}",
        s.label.apply_to("Selected"),
        s.value.apply_to(format!(
            "{} (edge {}, crowding {}, significance {}{})",
            report.selected,
            report.after_edge,
            report.after_crowding,
            report.after_significance,
            if report.trimmed { ", trimmed" } else { "" }
        ))
    );
    println!();
}
