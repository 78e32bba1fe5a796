use svgtex_core::{Dimensions, ResolvedText, SvgTexConfig};

/// Length of one SVG user unit in millimetres (90 dpi).
pub const UNIT_LENGTH_MM: f64 = 1.0 / 3.543307;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PictureOptions {
    /// Image drawn under the text, e.g. the PDF export of the textless SVG.
    pub background: Option<String>,
    /// Escape LaTeX special characters in the text. Off by default, since drawings commonly
    /// carry math markup such as `$\alpha$`.
    pub escape_text: bool,
}

impl PictureOptions {
    /// Reads `latex.background` and `latex.escapeText`.
    pub fn from_config(config: &SvgTexConfig) -> Self {
        Self {
            background: config
                .get_str("latex.background")
                .filter(|bg| !bg.trim().is_empty())
                .map(str::to_string),
            escape_text: config.get_bool("latex.escapeText").unwrap_or(false),
        }
    }
}

fn fmt_number_into(out: &mut String, mut v: f64, buf: &mut ryu_js::Buffer) {
    if !v.is_finite() {
        out.push('0');
        return;
    }
    if v == -0.0 {
        v = 0.0;
    }
    out.push_str(buf.format_finite(v));
}

/// Renders `texts` as a `picture` environment the size of the drawing.
///
/// SVG's y axis points down, so the picture origin is moved to the top-left corner and every
/// y coordinate is negated.
pub fn render_picture(
    texts: &[ResolvedText],
    dimensions: Dimensions,
    options: &PictureOptions,
) -> String {
    let mut buf = ryu_js::Buffer::new();
    let mut out = String::new();
    let Dimensions { width, height } = dimensions;

    out.push_str("\\setlength{\\unitlength}{");
    fmt_number_into(&mut out, UNIT_LENGTH_MM, &mut buf);
    out.push_str("mm}\n");

    out.push_str("\\begin{picture}(");
    fmt_number_into(&mut out, width, &mut buf);
    out.push_str(", ");
    fmt_number_into(&mut out, height, &mut buf);
    out.push_str(")(0, ");
    fmt_number_into(&mut out, -height, &mut buf);
    out.push_str(")\n");

    if let Some(background) = options
        .background
        .as_deref()
        .filter(|bg| !bg.trim().is_empty())
    {
        out.push_str("  \\put(0,");
        fmt_number_into(&mut out, -height, &mut buf);
        out.push_str("){\\includegraphics[height=");
        fmt_number_into(&mut out, height * UNIT_LENGTH_MM, &mut buf);
        out.push_str("mm, width=");
        fmt_number_into(&mut out, width * UNIT_LENGTH_MM, &mut buf);
        out.push_str("mm]{");
        out.push_str(background);
        out.push_str("}}\n");
    }

    for text in texts {
        out.push_str("  \\put(");
        fmt_number_into(&mut out, text.x, &mut buf);
        out.push(',');
        fmt_number_into(&mut out, -text.y, &mut buf);
        out.push_str("){");
        if text.rotation_degrees != 0.0 {
            out.push_str("\\turnbox{");
            fmt_number_into(&mut out, -text.rotation_degrees, &mut buf);
            out.push_str("}{");
        }
        out.push_str("\\makebox(0,0)[");
        out.push_str(text.anchor.box_position());
        out.push_str("]{");
        if options.escape_text {
            escape_latex_into(&mut out, &text.text);
        } else {
            out.push_str(&text.text);
        }
        out.push('}');
        if text.rotation_degrees != 0.0 {
            out.push('}');
        }
        out.push_str("}\n");
    }

    out.push_str("\\end{picture}\n");
    tracing::debug!(texts = texts.len(), "rendered picture");
    out
}

fn escape_latex_into(out: &mut String, text: &str) {
    let mut start = 0usize;
    for (i, ch) in text.char_indices() {
        let esc = match ch {
            '\\' => "\\textbackslash{}",
            '{' => "\\{",
            '}' => "\\}",
            '$' => "\\$",
            '&' => "\\&",
            '#' => "\\#",
            '%' => "\\%",
            '_' => "\\_",
            '^' => "\\textasciicircum{}",
            '~' => "\\textasciitilde{}",
            _ => continue,
        };
        out.push_str(&text[start..i]);
        out.push_str(esc);
        start = i + ch.len_utf8();
    }
    out.push_str(&text[start..]);
}
