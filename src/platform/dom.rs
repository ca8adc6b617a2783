//! DOM view
//!
//! Mirrors [`GameState`] onto the page: screen visibility, the score
//! readout, the player's position and one `div.ball` per live ball.

use std::collections::{HashMap, HashSet};

use wasm_bindgen::{JsCast, JsValue};
use web_sys::{Document, Element, HtmlElement};

use crate::sim::{GameState, Screen};

fn html_element(document: &Document, id: &str) -> Result<HtmlElement, JsValue> {
    document
        .get_element_by_id(id)
        .ok_or_else(|| JsValue::from_str(&format!("missing #{id}")))?
        .dyn_into::<HtmlElement>()
        .map_err(|_| JsValue::from_str(&format!("#{id} is not an HTML element")))
}

fn optional_element(document: &Document, id: &str) -> Option<HtmlElement> {
    let el = html_element(document, id).ok();
    if el.is_none() {
        log::warn!("No #{} element on the page", id);
    }
    el
}

fn set_style(el: &HtmlElement, property: &str, value: &str) {
    let _ = el.style().set_property(property, value);
}

pub struct DomView {
    document: Document,
    intro: Option<HtmlElement>,
    play_area: HtmlElement,
    player: HtmlElement,
    score: Option<Element>,
    end: Option<HtmlElement>,
    /// Ball id -> its element
    balls: HashMap<u32, HtmlElement>,
    last_score: Option<u32>,
}

impl DomView {
    /// Look up the page elements. The play area and player are required.
    pub fn new(document: Document) -> Result<Self, JsValue> {
        let play_area = html_element(&document, "gameArea")?;
        let player = html_element(&document, "player")?;
        let intro = optional_element(&document, "introScreen");
        let end = optional_element(&document, "endScreen");
        let score = document.get_element_by_id("score");
        if score.is_none() {
            log::warn!("No #score element on the page");
        }

        Ok(Self {
            document,
            intro,
            play_area,
            player,
            score,
            end,
            balls: HashMap::new(),
            last_score: None,
        })
    }

    /// Measured (play area width, play area height, player width)
    pub fn measure(&self) -> (f32, f32, f32) {
        (
            self.play_area.offset_width() as f32,
            self.play_area.offset_height() as f32,
            self.player.offset_width() as f32,
        )
    }

    /// Show exactly one of the three screens
    pub fn show_screen(&self, screen: Screen) {
        if let Some(intro) = &self.intro {
            set_style(intro, "display", if screen == Screen::Intro { "flex" } else { "none" });
        }
        set_style(
            &self.play_area,
            "display",
            if screen == Screen::Play { "block" } else { "none" },
        );
        if let Some(end) = &self.end {
            set_style(end, "display", if screen == Screen::End { "flex" } else { "none" });
        }
    }

    /// Sync score, player and balls with the simulation
    pub fn render(&mut self, state: &GameState, ball_size: f32) -> Result<(), JsValue> {
        if self.last_score != Some(state.score) {
            if let Some(score) = &self.score {
                score.set_text_content(Some(&state.score_text()));
            }
            self.last_score = Some(state.score);
        }

        set_style(&self.player, "left", &format!("{}px", state.player.x));

        let live: HashSet<u32> = state.balls.iter().map(|b| b.id).collect();
        self.balls.retain(|id, el| {
            let keep = live.contains(id);
            if !keep {
                el.remove();
            }
            keep
        });

        for ball in &state.balls {
            let el = match self.balls.get(&ball.id) {
                Some(el) => el.clone(),
                None => {
                    let el: HtmlElement = self.document.create_element("div")?.dyn_into()?;
                    el.set_class_name("ball");
                    let size = format!("{ball_size}px");
                    set_style(&el, "width", &size);
                    set_style(&el, "height", &size);
                    self.play_area.append_child(&el)?;
                    self.balls.insert(ball.id, el.clone());
                    el
                }
            };
            set_style(&el, "left", &format!("{}px", ball.pos.x));
            set_style(&el, "top", &format!("{}px", ball.pos.y));
        }

        Ok(())
    }

    /// Number of ball elements currently on the page
    pub fn ball_elements(&self) -> usize {
        self.balls.len()
    }
}
