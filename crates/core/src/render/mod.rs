pub mod fonts;

use crate::domain::deal::Deal;
use crate::theme::{Palette, Theme};
use ab_glyph::{FontVec, PxScale};
use chrono::NaiveDate;
use image::{ImageFormat, Rgb, RgbImage};
use imageproc::drawing::{
    draw_filled_rect_mut, draw_hollow_rect_mut, draw_line_segment_mut, draw_text_mut, text_size,
};
use imageproc::rect::Rect;
use std::fmt;
use std::io::Cursor;
use std::path::{Path, PathBuf};

/// Renderer failure: graphics or font resources could not be loaded, or the
/// canvas could not be encoded. Carries a diagnostic for the log sink; the
/// user-facing caption never includes it.
#[derive(Debug, Clone)]
pub struct RenderError {
    pub stage: &'static str,
    pub detail: String,
}

impl RenderError {
    pub fn new(stage: &'static str, detail: impl Into<String>) -> Self {
        Self {
            stage,
            detail: detail.into(),
        }
    }
}

impl fmt::Display for RenderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "poster render failed (stage={}): {}", self.stage, self.detail)
    }
}

impl std::error::Error for RenderError {}

/// Rendered artifact: encoded bytes plus dimensions. The caller owns the
/// write to disk, so a failed render never leaves a partial file behind.
#[derive(Debug, Clone)]
pub struct Poster {
    pub png: Vec<u8>,
    pub width: u32,
    pub height: u32,
}

#[derive(Debug, Clone)]
pub struct RenderOptions {
    pub asset_dir: PathBuf,
    pub font_path: Option<PathBuf>,
}

pub const CANVAS_WIDTH: u32 = 1080;
pub const CANVAS_HEIGHT: u32 = 1920;

const DEFAULT_TITLE: &str = "今日快餐比价早报";
const FOOTER_TEXT: &str = "提示：以上价格与活动以各品牌官方实际为准，仅供参考。";
const BADGE_TEXT: &str = "今日最划算";
const DEFAULT_RECOMMENDATION: &str = "适合作为今日的实惠之选。";

const DEFAULT_PALETTE: Palette = Palette {
    background: [0xff, 0x6b, 0x3b],
    accent: [0xff, 0xdd, 0x55],
    text: [0xff, 0xff, 0xff],
};

const BASE_FILL: Rgb<u8> = Rgb([0xf7, 0xf7, 0xf7]);
const CARD_FILL: Rgb<u8> = Rgb([0xff, 0xff, 0xff]);
const BODY_TEXT: Rgb<u8> = Rgb([0x33, 0x33, 0x33]);
const MUTED_TEXT: Rgb<u8> = Rgb([0x99, 0x99, 0x99]);
const STRIKE_LINE: Rgb<u8> = Rgb([0xbb, 0xbb, 0xbb]);
const FINAL_PRICE_TEXT: Rgb<u8> = Rgb([0xff, 0x3b, 0x30]);
const RECOMMEND_TEXT: Rgb<u8> = Rgb([0x55, 0x55, 0x55]);

const HEADER_HEIGHT: i32 = 260;
const MARGIN_X: i32 = 80;
const CARD_HEIGHT: i32 = 260;
const CARD_GAP: i32 = 30;

const TITLE_SCALE: f32 = 64.0;
const SUBTITLE_SCALE: f32 = 32.0;
const BODY_SCALE: f32 = 28.0;
const PRICE_SCALE: f32 = 40.0;

/// Fully resolved layout input, constructed once per render call.
struct PosterSpec<'a> {
    date: NaiveDate,
    deals: &'a [Deal],
    best_index: Option<usize>,
    palette: Palette,
    title: &'a str,
    background_asset_key: Option<&'a str>,
    asset_dir: &'a Path,
}

/// Compose the daily poster. Deterministic for identical inputs and assets;
/// performs no network access — remote deal images render as placeholders.
pub fn render(
    date: NaiveDate,
    deals: &[Deal],
    best_index: Option<usize>,
    theme: Option<&Theme>,
    opts: &RenderOptions,
) -> Result<Poster, RenderError> {
    let spec = PosterSpec {
        date,
        deals,
        best_index,
        palette: theme.map(|t| t.palette).unwrap_or(DEFAULT_PALETTE),
        title: theme
            .and_then(|t| t.title_override)
            .unwrap_or(DEFAULT_TITLE),
        background_asset_key: theme.and_then(|t| t.background_asset_key),
        asset_dir: &opts.asset_dir,
    };

    let font = fonts::load_font(opts.font_path.as_deref())?;
    let image = compose(&spec, &font);
    encode(&image)
}

fn compose(spec: &PosterSpec<'_>, font: &FontVec) -> RgbImage {
    let mut image = RgbImage::from_pixel(CANVAS_WIDTH, CANVAS_HEIGHT, BASE_FILL);

    if let Some(key) = spec.background_asset_key {
        paint_background_asset(&mut image, spec.asset_dir, key);
    }

    draw_header(&mut image, spec, font);

    let mut y = HEADER_HEIGHT + 40;
    for (idx, deal) in spec.deals.iter().enumerate() {
        // Skip cards that would overflow the canvas instead of clipping them.
        if y + CARD_HEIGHT + 40 > CANVAS_HEIGHT as i32 {
            tracing::warn!(skipped = spec.deals.len() - idx, "poster full, skipping cards");
            break;
        }
        draw_card(&mut image, spec, deal, spec.best_index == Some(idx), y, font);
        y += CARD_HEIGHT + CARD_GAP;
    }

    draw_footer(&mut image, font);
    image
}

/// Theme background image stretched to the canvas. Missing or undecodable
/// assets fall back to the solid fill, silently apart from a warn log.
fn paint_background_asset(image: &mut RgbImage, asset_dir: &Path, key: &str) {
    let path = asset_dir.join(format!("{key}.png"));
    match image::open(&path) {
        Ok(asset) => {
            let scaled = image::imageops::resize(
                &asset.to_rgb8(),
                CANVAS_WIDTH,
                CANVAS_HEIGHT,
                image::imageops::FilterType::Lanczos3,
            );
            image::imageops::replace(image, &scaled, 0, 0);
        }
        Err(err) => {
            tracing::warn!(path = %path.display(), error = %err, "background asset unavailable, using solid color");
        }
    }
}

fn draw_header(image: &mut RgbImage, spec: &PosterSpec<'_>, font: &FontVec) {
    draw_filled_rect_mut(
        image,
        Rect::at(0, 0).of_size(CANVAS_WIDTH, HEADER_HEIGHT as u32),
        Rgb(spec.palette.background),
    );

    let center_x = CANVAS_WIDTH as i32 / 2;
    draw_centered_text(
        image,
        spec.title,
        center_x,
        90,
        scale(TITLE_SCALE),
        font,
        Rgb(spec.palette.text),
    );

    let date_line = format!("日期：{}", spec.date.format("%Y-%m-%d"));
    draw_centered_text(
        image,
        &date_line,
        center_x,
        170,
        scale(SUBTITLE_SCALE),
        font,
        Rgb(spec.palette.accent),
    );
}

fn draw_card(
    image: &mut RgbImage,
    spec: &PosterSpec<'_>,
    deal: &Deal,
    is_best: bool,
    card_top: i32,
    font: &FontVec,
) {
    let card_width = CANVAS_WIDTH as i32 - 2 * MARGIN_X;
    let accent = Rgb(spec.palette.background);

    draw_filled_rect_mut(
        image,
        Rect::at(MARGIN_X, card_top).of_size(card_width as u32, CARD_HEIGHT as u32),
        CARD_FILL,
    );

    // Left placeholder box standing in for the (never fetched) deal image.
    let box_left = MARGIN_X + 30;
    let box_top = card_top + 40;
    let box_width = 200u32;
    let box_height = (CARD_HEIGHT - 80) as u32;
    draw_filled_rect_mut(
        image,
        Rect::at(box_left, box_top).of_size(box_width, box_height),
        Rgb(tint(spec.palette.background, 0.85)),
    );
    for inset in 0..3 {
        draw_hollow_rect_mut(
            image,
            Rect::at(box_left + inset, box_top + inset)
                .of_size(box_width - 2 * inset as u32, box_height - 2 * inset as u32),
            Rgb(tint(spec.palette.background, 0.5)),
        );
    }

    let brand_short: String = if deal.brand.is_empty() {
        "快餐".to_string()
    } else {
        deal.brand.chars().take(2).collect()
    };
    draw_centered_text(
        image,
        &brand_short,
        box_left + box_width as i32 / 2,
        box_top + box_height as i32 / 2,
        scale(PRICE_SCALE),
        font,
        accent,
    );

    let text_x = box_left + box_width as i32 + 40;
    let text_y = card_top + 40;

    let headline = format!("{} | {}", deal.brand, deal.title);
    draw_text_mut(image, BODY_TEXT, text_x, text_y, scale(SUBTITLE_SCALE), font, &headline);

    // Original price with a strike-through for visual de-emphasis.
    let price_y = text_y + 70;
    let original_line = format!("原价：¥{:.1}", deal.original_price);
    draw_text_mut(image, MUTED_TEXT, text_x, price_y, scale(BODY_SCALE), font, &original_line);
    let (line_w, line_h) = measure(scale(BODY_SCALE), font, &original_line);
    let strike_y = (price_y + line_h / 2) as f32;
    draw_line_segment_mut(
        image,
        (text_x as f32, strike_y),
        ((text_x + line_w) as f32, strike_y),
        STRIKE_LINE,
    );

    let final_y = price_y + 50;
    let final_line = format!("到手价：¥{:.1}", deal.final_price);
    draw_text_mut(image, FINAL_PRICE_TEXT, text_x, final_y, scale(PRICE_SCALE), font, &final_line);

    let discount_y = final_y + 60;
    let discount_line = format!("优惠力度：约 {:.1}%", deal.discount_percent);
    draw_text_mut(image, accent, text_x, discount_y, scale(BODY_SCALE), font, &discount_line);

    let rec_y = discount_y + 40;
    let recommendation = deal
        .recommendation
        .as_deref()
        .unwrap_or(DEFAULT_RECOMMENDATION);
    let rec_line = format!("建议：{recommendation}");
    draw_text_mut(image, RECOMMEND_TEXT, text_x, rec_y, scale(BODY_SCALE), font, &rec_line);

    if is_best {
        draw_badge(image, spec, card_top, font);
    }
}

fn draw_badge(image: &mut RgbImage, spec: &PosterSpec<'_>, card_top: i32, font: &FontVec) {
    let (badge_w, badge_h) = measure(scale(BODY_SCALE), font, BADGE_TEXT);
    let pad_x = 18;
    let pad_y = 10;

    let badge_right = CANVAS_WIDTH as i32 - MARGIN_X - 26;
    let badge_left = badge_right - badge_w - 2 * pad_x;
    let badge_top = card_top + 26;
    let badge_height = (badge_h + 2 * pad_y) as u32;

    draw_filled_rect_mut(
        image,
        Rect::at(badge_left, badge_top).of_size((badge_w + 2 * pad_x) as u32, badge_height),
        Rgb(spec.palette.accent),
    );
    draw_text_mut(
        image,
        Rgb(shade(spec.palette.accent, 0.45)),
        badge_left + pad_x,
        badge_top + pad_y,
        scale(BODY_SCALE),
        font,
        BADGE_TEXT,
    );
}

fn draw_footer(image: &mut RgbImage, font: &FontVec) {
    let (w, _) = measure(scale(BODY_SCALE), font, FOOTER_TEXT);
    let x = (CANVAS_WIDTH as i32 - w) / 2;
    let y = CANVAS_HEIGHT as i32 - 80;
    draw_text_mut(image, MUTED_TEXT, x, y, scale(BODY_SCALE), font, FOOTER_TEXT);
}

fn encode(image: &RgbImage) -> Result<Poster, RenderError> {
    let mut png = Vec::new();
    image
        .write_to(&mut Cursor::new(&mut png), ImageFormat::Png)
        .map_err(|err| RenderError::new("encode", format!("png encoding failed: {err}")))?;

    Ok(Poster {
        png,
        width: image.width(),
        height: image.height(),
    })
}

fn draw_centered_text(
    image: &mut RgbImage,
    text: &str,
    center_x: i32,
    center_y: i32,
    scale: PxScale,
    font: &FontVec,
    color: Rgb<u8>,
) {
    let (w, h) = measure(scale, font, text);
    draw_text_mut(image, color, center_x - w / 2, center_y - h / 2, scale, font, text);
}

fn measure(scale: PxScale, font: &FontVec, text: &str) -> (i32, i32) {
    let (w, h) = text_size(scale, font, text);
    (w as i32, h as i32)
}

fn scale(size: f32) -> PxScale {
    PxScale::from(size)
}

fn tint(color: [u8; 3], factor: f32) -> [u8; 3] {
    color.map(|c| {
        let c = c as f32;
        (c + (255.0 - c) * factor).round() as u8
    })
}

fn shade(color: [u8; 3], factor: f32) -> [u8; 3] {
    color.map(|c| (c as f32 * factor).round() as u8)
}
