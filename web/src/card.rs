use gloo::render::{AnimationFrame, request_animation_frame};
use unveil_core::{CardConfig, RevealSession, SequenceToken, Signals};
use wasm_bindgen::JsValue;
use wasm_bindgen_futures::{JsFuture, spawn_local};
use web_sys::{HtmlAudioElement, HtmlCanvasElement, HtmlImageElement, PointerEvent};
use yew::prelude::*;

use crate::drawables::Drawables;
use crate::utils::context_2d;

pub(crate) enum Msg {
    PointerMove { x: f64, y: f64 },
    Frame { token: SequenceToken, timestamp: f64 },
    PhotoLoaded,
    Reset,
}

#[derive(Properties, Clone, PartialEq)]
pub(crate) struct CardProps {
    pub config: CardConfig,
    pub photo_src: AttrValue,
    pub audio_src: AttrValue,
}

/// Hosts the canvas and audio element and feeds pointer moves and animation frames into a
/// [`RevealSession`].
pub(crate) struct CardView {
    canvas: NodeRef,
    photo: NodeRef,
    audio: NodeRef,
    // `None` until the canvas is mounted and measured
    session: Option<RevealSession>,
    drawables: Option<Drawables>,
    photo_loaded: bool,
    last_frame_at: Option<f64>,
    show_reset: bool,
    _frame: Option<AnimationFrame>,
}

impl CardView {
    fn setup(&mut self, config: CardConfig) {
        let Some(canvas) = self.canvas.cast::<HtmlCanvasElement>() else {
            log::error!("canvas is not mounted");
            return;
        };

        let (width, height) = (canvas.client_width(), canvas.client_height());
        let config = if width > 0 && height > 0 {
            canvas.set_width(width as u32);
            canvas.set_height(height as u32);
            CardConfig {
                canvas_width: f64::from(width),
                canvas_height: f64::from(height),
                ..config
            }
        } else {
            log::warn!("canvas has no layout size, using {:?}", config);
            canvas.set_width(config.canvas_width as u32);
            canvas.set_height(config.canvas_height as u32);
            config
        };

        match RevealSession::new(config) {
            Ok(session) => {
                self.drawables = Some(Drawables::plain(session.grid()));
                self.session = Some(session);
                self.load_drawables();
            }
            Err(err) => log::error!("could not set up card: {}", err),
        }
    }

    fn load_drawables(&mut self) {
        let (Some(session), Some(photo)) = (&self.session, self.photo.cast::<HtmlImageElement>())
        else {
            return;
        };
        if !self.photo_loaded {
            return;
        }
        match Drawables::from_photo(session.grid(), &photo) {
            Ok(drawables) => self.drawables = Some(drawables),
            Err(err) => log::error!("could not sample photo: {:?}", err),
        }
    }

    fn draw(&self) {
        let (Some(session), Some(drawables), Some(canvas)) = (
            &self.session,
            &self.drawables,
            self.canvas.cast::<HtmlCanvasElement>(),
        ) else {
            return;
        };
        let Some(context) = context_2d(&canvas) else {
            return;
        };
        let photo = self.photo.cast::<HtmlImageElement>();
        if let Err(err) = drawables.draw(&context, session, photo.as_ref()) {
            log::error!("draw failed: {:?}", err);
        }
    }

    fn schedule_frame(&mut self, ctx: &Context<Self>, token: SequenceToken) {
        let link = ctx.link().clone();
        self._frame = Some(request_animation_frame(move |timestamp| {
            link.send_message(Msg::Frame { token, timestamp })
        }));
    }

    fn audio(&self) -> Option<HtmlAudioElement> {
        self.audio.cast::<HtmlAudioElement>()
    }

    fn start_audio(&self) {
        let Some(audio) = self.audio() else {
            return;
        };
        audio.set_volume(0.0);
        // autoplay blocking rejects the promise, the card then runs silently
        spawn_local(async move {
            if let Err(err) = play(&audio).await {
                log::warn!("could not play audio: {:?}", err);
            }
        });
    }

    fn stop_audio(&self) {
        let Some(audio) = self.audio() else {
            return;
        };
        if let Err(err) = audio.pause() {
            log::error!("could not pause audio: {:?}", err);
        }
        audio.set_current_time(0.0);
        audio.set_volume(0.0);
    }
}

/// Starts playback and waits until the browser accepts or rejects it.
pub(crate) async fn play(audio: &HtmlAudioElement) -> Result<(), JsValue> {
    JsFuture::from(audio.play()?).await.map(|_| ())
}

impl Component for CardView {
    type Message = Msg;
    type Properties = CardProps;

    fn create(_ctx: &Context<Self>) -> Self {
        Self {
            canvas: NodeRef::default(),
            photo: NodeRef::default(),
            audio: NodeRef::default(),
            session: None,
            drawables: None,
            photo_loaded: false,
            last_frame_at: None,
            show_reset: false,
            _frame: None,
        }
    }

    fn update(&mut self, ctx: &Context<Self>, msg: Self::Message) -> bool {
        use Msg::*;

        match msg {
            PointerMove { x, y } => {
                let Some(session) = self.session.as_mut() else {
                    return false;
                };
                let signals = session.pointer_move(x, y);
                let token = session.sequence_token();
                if signals.contains(Signals::THRESHOLD_CROSSED)
                    && let Some(token) = token
                {
                    log::info!("threshold crossed, starting sequence");
                    self.last_frame_at = None;
                    self.start_audio();
                    self.schedule_frame(ctx, token);
                }
                self.draw();
                false
            }
            Frame { token, timestamp } => {
                let Some(session) = self.session.as_mut() else {
                    return false;
                };
                let delta = self
                    .last_frame_at
                    .map_or(0.0, |last_frame_at| timestamp - last_frame_at);
                self.last_frame_at = Some(timestamp);

                let signals = session.tick(token, delta);
                let frame = session.frame();
                let still_running = session.sequence_token() == Some(token);
                if let Some(audio) = self.audio() {
                    audio.set_volume(frame.audio_gain.clamp(0.0, 1.0));
                }

                if still_running {
                    self.schedule_frame(ctx, token);
                } else {
                    self._frame = None;
                }
                self.draw();

                if signals.contains(Signals::SEQUENCE_COMPLETE) {
                    log::info!("sequence complete");
                    self.show_reset = true;
                    true
                } else {
                    false
                }
            }
            PhotoLoaded => {
                self.photo_loaded = true;
                self.load_drawables();
                self.draw();
                false
            }
            Reset => {
                if let Some(session) = self.session.as_mut() {
                    session.reset();
                }
                self._frame = None;
                self.last_frame_at = None;
                self.stop_audio();
                self.show_reset = false;
                self.draw();
                true
            }
        }
    }

    fn view(&self, ctx: &Context<Self>) -> Html {
        let CardProps {
            photo_src,
            audio_src,
            ..
        } = ctx.props().clone();

        let onpointermove = ctx.link().callback(|e: PointerEvent| Msg::PointerMove {
            x: f64::from(e.offset_x()),
            y: f64::from(e.offset_y()),
        });
        let onload = ctx.link().callback(|_: Event| Msg::PhotoLoaded);
        let onclick = ctx.link().callback(|_: MouseEvent| Msg::Reset);
        let reset_class = classes!(
            "button",
            "reset",
            if self.show_reset { "show" } else { "hide" }
        );

        html! {
            <div class="card-container">
                <canvas ref={self.canvas.clone()} class="card-canvas" {onpointermove}/>
                <img ref={self.photo.clone()} src={photo_src} style="display: none" {onload}/>
                <button class={reset_class} {onclick}/>
                <audio ref={self.audio.clone()} src={audio_src}/>
            </div>
        }
    }

    fn rendered(&mut self, ctx: &Context<Self>, first_render: bool) {
        if !first_render {
            return;
        }
        if let Some(audio) = self.audio() {
            audio.set_loop(true);
        }
        if let Some(photo) = self.photo.cast::<HtmlImageElement>() {
            // a cached photo can finish loading before the listener is attached
            self.photo_loaded = photo.complete() && photo.natural_width() > 0;
        }
        self.setup(ctx.props().config);
        self.draw();
    }
}
