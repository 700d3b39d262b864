use super::Region;
use crate::{
    content::Term,
    design::{fit_text, ResolvedStyle, TableStyle},
    pptx::{Emu, Font, Insets, LineStyle, Paragraph, Rgb, Run, Table, TableCell, TableRow, TextFrame},
};

/// Build a two column table with a header row followed by a row per term.
pub(crate) fn term_table(terms: &[Term], region: Region, slide_style: &ResolvedStyle, style: &TableStyle) -> Table {
    let row_height = Emu::from_inches(region.height / (terms.len() + 1) as f64);
    let header_font = Font {
        name: Some(font_name(slide_style, style)),
        size: Some(style.header_font_size),
        bold: Some(style.header_font_bold),
        italic: None,
        color: Some(style.header_text_color),
    };
    let header_cells = (0..2)
        .map(|column| {
            let label = style.header_labels.get(column).map(String::as_str).unwrap_or_default();
            cell(Run::new(label, header_font.clone()), style.header_bg_color, slide_style, style)
        })
        .collect();

    let mut rows = vec![TableRow { height: row_height, cells: header_cells }];
    for term in terms {
        let cells = [&term.term, &term.definition]
            .into_iter()
            .map(|text| cell(body_run(text, slide_style, style), style.body_bg_color, slide_style, style))
            .collect();
        rows.push(TableRow { height: row_height, cells });
    }
    Table {
        columns: column_widths(&style.column_width_ratio, region.width),
        rows,
        border: Some(LineStyle { color: style.border_color, width: style.border_width }),
    }
}

fn font_name(slide_style: &ResolvedStyle, style: &TableStyle) -> String {
    style.font_name.clone().unwrap_or_else(|| slide_style.body_font.clone())
}

fn body_run(text: &str, slide_style: &ResolvedStyle, style: &TableStyle) -> Run {
    let font_size = style.body_font_size.unwrap_or(slide_style.body_font_size);
    let (text, font_size) = if style.auto_wrap_text {
        let fitted = fit_text(text, font_size, slide_style);
        (fitted.text, fitted.font_size)
    } else {
        (text.to_string(), font_size)
    };
    let font = Font {
        name: Some(font_name(slide_style, style)),
        size: Some(font_size),
        bold: None,
        italic: None,
        color: Some(style.text_color),
    };
    Run::new(text, font)
}

fn cell(run: Run, fill: Rgb, slide_style: &ResolvedStyle, style: &TableStyle) -> TableCell {
    let paragraph = Paragraph {
        runs: vec![run],
        alignment: Some(style.text_alignment),
        line_spacing: Some(style.line_spacing.unwrap_or(slide_style.line_spacing)),
        ..Default::default()
    };
    let margins = Insets::from_points(style.padding_top, style.padding_bottom, style.padding_left, style.padding_right);
    TableCell {
        text: TextFrame { paragraphs: vec![paragraph], ..Default::default() },
        fill: Some(fill),
        margins: Some(margins),
        anchor: style.vertical_alignment,
    }
}

/// Split a width between the two columns using the first two ratios. Missing or non positive
/// ratios split it evenly.
fn column_widths(ratio: &[f64], width: f64) -> Vec<Emu> {
    let [first, second] = match ratio {
        [first, second, ..] if *first > 0.0 && *second > 0.0 => [*first, *second],
        _ => [1.0, 1.0],
    };
    let total = first + second;
    vec![Emu::from_inches(width * first / total), Emu::from_inches(width * second / total)]
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::pptx::{Alignment, VerticalAnchor};
    use rstest::rstest;

    const REGION: Region = Region { x: 1.0, y: 2.0, width: 8.0, height: 4.5 };

    fn terms() -> Vec<Term> {
        vec![
            Term { term: "AI".into(), definition: "artificial intelligence".into() },
            Term { term: "LLM".into(), definition: "large language model".into() },
        ]
    }

    fn cell_font(table: &Table, row: usize, column: usize) -> &Font {
        &table.cell(row, column).expect("no cell").text.paragraphs[0].runs[0].font
    }

    #[test]
    fn default_style() {
        let table = term_table(&terms(), REGION, &ResolvedStyle::default(), &TableStyle::default());
        assert_eq!(table.row_count(), 3);
        assert_eq!(table.column_count(), 2);
        assert_eq!(table.cell(0, 0).expect("no cell").text.text(), "용어");
        assert_eq!(table.cell(0, 1).expect("no cell").text.text(), "개념");
        assert_eq!(table.cell(2, 1).expect("no cell").text.text(), "large language model");

        let header = cell_font(&table, 0, 0);
        assert_eq!(header.size, Some(18.0));
        assert_eq!(header.bold, Some(true));
        assert_eq!(header.name.as_deref(), Some("Pretendard"));

        // Body cells use the slide's body font size unless the table style sets one.
        assert_eq!(cell_font(&table, 1, 1).size, Some(20.0));

        let cell = table.cell(1, 0).expect("no cell");
        assert_eq!(cell.fill, Some(Rgb::WHITE));
        assert_eq!(cell.anchor, VerticalAnchor::Middle);
        assert_eq!(cell.margins, Some(Insets::from_points(5.0, 5.0, 10.0, 10.0)));
        assert_eq!(cell.text.paragraphs[0].alignment, Some(Alignment::Center));
        assert_eq!(table.cell(0, 1).expect("no cell").fill, Some(Rgb::new(230, 240, 255)));
        assert_eq!(table.border, Some(LineStyle { color: Rgb::new(200, 200, 200), width: 1.0 }));
    }

    #[test]
    fn table_style_wins() {
        let style = TableStyle { body_font_size: Some(14.0), font_name: Some("Arial".into()), ..Default::default() };
        let slide_style = ResolvedStyle { body_font_size: 16.0, ..Default::default() };
        let table = term_table(&terms(), REGION, &slide_style, &style);
        assert_eq!(cell_font(&table, 1, 0).size, Some(14.0));
        assert_eq!(cell_font(&table, 1, 0).name.as_deref(), Some("Arial"));
    }

    #[test]
    fn long_definitions() {
        let long = Term { term: "long".into(), definition: "word ".repeat(30).trim().to_string() };
        let slide_style =
            ResolvedStyle { auto_font_resize_threshold: 50, wrap_text_threshold: 100, ..Default::default() };

        let table = term_table(&[long.clone()], REGION, &slide_style, &TableStyle::default());
        assert_eq!(cell_font(&table, 1, 1).size, Some(18.0));
        assert!(table.cell(1, 1).expect("no cell").text.text().contains('\n'));

        let style = TableStyle { auto_wrap_text: false, ..Default::default() };
        let table = term_table(&[long], REGION, &slide_style, &style);
        assert_eq!(cell_font(&table, 1, 1).size, Some(20.0));
    }

    #[rstest]
    #[case::default(&[0.3, 0.7], [2.4, 5.6])]
    #[case::unnormalized(&[1.0, 3.0], [2.0, 6.0])]
    #[case::extra(&[1.0, 1.0, 5.0], [4.0, 4.0])]
    #[case::missing(&[1.0], [4.0, 4.0])]
    #[case::negative(&[-1.0, 1.0], [4.0, 4.0])]
    fn widths(#[case] ratio: &[f64], #[case] expected: [f64; 2]) {
        let expected: Vec<_> = expected.into_iter().map(Emu::from_inches).collect();
        assert_eq!(column_widths(ratio, 8.0), expected);
    }
}
