use gloo_net::http::Request;
use serde_json::json;
use showcase::{
    anchor,
    config::{SectionEntry, SectionKind, SiteConfig},
    contact::{self, ContactMessage},
    counter::{self, StatCounter},
    filter::{FilterKey, ProjectBoard},
    log::{log_event, LogLevel, Logger},
    scroll::{ElementRect, Measurements, ScrollReactor, ScrollSnapshot, ScrollView, SectionBounds, Thresholds},
    timer::Scheduler,
    typewriter::{self, TextTarget, Typewriter, TypewriterTiming},
};
use std::{cell::RefCell, rc::Rc, time::Duration};
use wasm_bindgen::{closure::Closure, JsCast};
use wasm_bindgen_futures::spawn_local;
use web_sys::{
    window, Element, HtmlElement, HtmlFormElement, HtmlInputElement, HtmlTextAreaElement,
    MouseEvent, ScrollBehavior, ScrollToOptions, SubmitEvent,
};
use yew::prelude::*;

const SITE_CONFIG_URL: &str = "/site.json";
const FALLBACK_VIEWPORT_HEIGHT: f64 = 720.0;

/// Schedules tasks with `window.setTimeout`.
struct BrowserScheduler;

impl Scheduler for BrowserScheduler {
    fn schedule(&self, delay: Duration, task: Box<dyn FnOnce()>) {
        let Some(win) = window() else {
            return;
        };
        let callback = Closure::once_into_js(move || task());
        let timeout = delay.as_millis().min(i32::MAX as u128) as i32;
        let _ = win
            .set_timeout_with_callback_and_timeout_and_arguments_0(callback.unchecked_ref(), timeout);
    }
}

fn browser_scheduler() -> Rc<dyn Scheduler> {
    Rc::new(BrowserScheduler)
}

/// Writes into whatever element the ref points at, if it is mounted.
struct NodeText(NodeRef);

impl TextTarget for NodeText {
    fn set_text(&self, text: &str) {
        if let Some(element) = self.0.cast::<Element>() {
            element.set_text_content(Some(text));
        }
    }
}

fn scroll_snapshot() -> Option<ScrollSnapshot> {
    let win = window()?;
    let offset = win.scroll_y().ok()?;
    let viewport_height = win
        .inner_height()
        .ok()
        .and_then(|value| value.as_f64())
        .unwrap_or(FALLBACK_VIEWPORT_HEIGHT);

    Some(ScrollSnapshot {
        offset,
        viewport_height,
    })
}

fn section_bounds(node: &NodeRef) -> Option<SectionBounds> {
    let element = node.cast::<HtmlElement>()?;
    Some(SectionBounds {
        top: f64::from(element.offset_top()),
        height: f64::from(element.offset_height()),
    })
}

fn element_rect(node: &NodeRef) -> Option<ElementRect> {
    let rect = node.cast::<Element>()?.get_bounding_client_rect();
    Some(ElementRect {
        top: rect.top(),
        height: rect.height(),
    })
}

fn smooth_scroll_to(top: f64) {
    let Some(win) = window() else {
        return;
    };
    let options = ScrollToOptions::new();
    options.set_top(top);
    options.set_behavior(ScrollBehavior::Smooth);
    win.scroll_to_with_scroll_to_options(&options);
}

fn scroll_to_section(section_id: &str, header_offset: f64) {
    let Some(target) = window()
        .and_then(|w| w.document())
        .and_then(|d| d.get_element_by_id(section_id))
        .and_then(|element| element.dyn_into::<HtmlElement>().ok())
    else {
        return;
    };

    smooth_scroll_to(anchor::scroll_target(
        f64::from(target.offset_top()),
        header_offset,
    ));
}

async fn fetch_site_config() -> Result<SiteConfig, String> {
    let response = Request::get(SITE_CONFIG_URL)
        .send()
        .await
        .map_err(|error| error.to_string())?;

    if !response.ok() {
        return Err(format!("status {}", response.status()));
    }

    let raw = response.text().await.map_err(|error| error.to_string())?;
    SiteConfig::from_json(&raw).map_err(|error| error.to_string())
}

fn build_reactor(config: &SiteConfig) -> ScrollReactor {
    let section_ids: Vec<&str> = config.sections.iter().map(|section| section.id.as_str()).collect();
    let link_targets: Vec<&str> = config.nav.iter().map(|entry| entry.section.as_str()).collect();
    let skill_levels: Vec<u8> = config.skills.iter().map(|skill| skill.level).collect();

    ScrollReactor::new(
        Thresholds::from(&config.scroll),
        &section_ids,
        &link_targets,
        &skill_levels,
        config.reveal_block_count(),
    )
}

fn input_value(node: &NodeRef) -> String {
    node.cast::<HtmlInputElement>()
        .map(|input| input.value())
        .unwrap_or_default()
}

fn node_refs(count: usize) -> Vec<NodeRef> {
    (0..count).map(|_| NodeRef::default()).collect()
}

#[derive(Properties, PartialEq)]
struct AnchorLinkProps {
    section: AttrValue,
    label: AttrValue,
    header_offset: f64,
    #[prop_or_default]
    class: Classes,
    #[prop_or_default]
    onnavigate: Callback<()>,
}

#[function_component(AnchorLink)]
fn anchor_link(props: &AnchorLinkProps) -> Html {
    let href = anchor::href_for(&props.section);

    let onclick = {
        let href = href.clone();
        let header_offset = props.header_offset;
        let onnavigate = props.onnavigate.clone();
        Callback::from(move |event: MouseEvent| {
            onnavigate.emit(());
            if let Some(section_id) = anchor::section_anchor(&href) {
                event.prevent_default();
                scroll_to_section(section_id, header_offset);
            }
        })
    };

    html! {
        <a class={props.class.clone()} href={href} onclick={onclick}>
            {props.label.clone()}
        </a>
    }
}

#[derive(Properties, PartialEq)]
struct ExternalLinkProps {
    href: AttrValue,
    label: AttrValue,
}

#[function_component(ExternalLink)]
fn external_link(props: &ExternalLinkProps) -> Html {
    html! {
        <a
            class="link"
            href={props.href.clone()}
            target="_blank"
            rel="noopener noreferrer"
        >
            {props.label.clone()}
            <span class="external-mark" aria-hidden="true">{"↗"}</span>
            <span class="sr-only">{" (opens in a new tab)"}</span>
        </a>
    }
}

#[derive(Properties, PartialEq)]
struct ContactFormProps {
    recipient: AttrValue,
    logger: Logger,
}

/// Opens the visitor's mail client with the form contents instead of posting.
#[function_component(ContactForm)]
fn contact_form(props: &ContactFormProps) -> Html {
    let form_ref = use_node_ref();
    let name_ref = use_node_ref();
    let email_ref = use_node_ref();
    let subject_ref = use_node_ref();
    let message_ref = use_node_ref();

    let onsubmit = {
        let form_ref = form_ref.clone();
        let name_ref = name_ref.clone();
        let email_ref = email_ref.clone();
        let subject_ref = subject_ref.clone();
        let message_ref = message_ref.clone();
        let recipient = props.recipient.clone();
        let logger = props.logger;
        Callback::from(move |event: SubmitEvent| {
            event.prevent_default();

            let message = ContactMessage {
                name: input_value(&name_ref),
                email: input_value(&email_ref),
                subject: input_value(&subject_ref),
                message: message_ref
                    .cast::<HtmlTextAreaElement>()
                    .map(|area| area.value())
                    .unwrap_or_default(),
            };
            let link = contact::mailto_link(&recipient, &message);

            let opened = window()
                .map(|win| win.location().set_href(&link).is_ok())
                .unwrap_or(false);
            log_event(
                &logger,
                LogLevel::Info,
                "contact_mail_opened",
                json!({ "opened": opened, "subject_len": message.subject.chars().count() }),
            );

            if let Some(form) = form_ref.cast::<HtmlFormElement>() {
                form.reset();
            }
        })
    };

    html! {
        <form id="contactForm" class="contact-form" ref={form_ref} onsubmit={onsubmit}>
            <label class="form-field">
                <span>{"Name"}</span>
                <input type="text" name="name" required=true ref={name_ref} />
            </label>
            <label class="form-field">
                <span>{"Email"}</span>
                <input type="email" name="email" required=true ref={email_ref} />
            </label>
            <label class="form-field">
                <span>{"Subject"}</span>
                <input type="text" name="subject" required=true ref={subject_ref} />
            </label>
            <label class="form-field">
                <span>{"Message"}</span>
                <textarea name="message" rows="5" required=true ref={message_ref}></textarea>
            </label>
            <button class="button primary" type="submit">{"Send message"}</button>
        </form>
    }
}

#[derive(Properties, PartialEq)]
struct PageProps {
    config: Rc<SiteConfig>,
}

#[function_component(Page)]
fn page(props: &PageProps) -> Html {
    let config = props.config.clone();
    let logger = Logger::new(config.log_level);
    let header_offset = config.motion.anchor_offset;

    let typed_ref = use_node_ref();
    let section_refs = use_memo(config.sections.len(), |count| node_refs(*count));
    let skill_refs = use_memo(config.skills.len(), |count| node_refs(*count));
    let reveal_refs = use_memo(config.reveal_block_count(), |count| node_refs(*count));

    let reactor = use_memo(config.clone(), |config| RefCell::new(build_reactor(config)));
    let scroll_view = use_state(ScrollView::default);

    let board = use_memo(config.clone(), |config| {
        let categories = config.projects.iter().map(|project| project.category.clone()).collect();
        RefCell::new(ProjectBoard::new(categories, &config.motion))
    });
    let refresh = use_force_update();

    let stat_values = use_state(|| vec![0_u32; config.stats.len()]);
    let menu_open = use_state(|| false);

    {
        let typed_ref = typed_ref.clone();
        use_effect_with(config.clone(), move |config| {
            let token = config.role_sequence().ok().map(|roles| {
                let typewriter = Typewriter::new(roles, TypewriterTiming::from(&config.typewriter));
                let (token, _) = typewriter::start(typewriter, NodeText(typed_ref), browser_scheduler());
                log_event(
                    &logger,
                    LogLevel::Debug,
                    "typewriter_started",
                    json!({ "roles": config.roles.len() }),
                );
                token
            });

            move || {
                if let Some(token) = token {
                    token.cancel();
                    log_event(&logger, LogLevel::Debug, "typewriter_stopped", json!({}));
                }
            }
        });
    }

    {
        let reactor = reactor.clone();
        let scroll_view = scroll_view.clone();
        let section_refs = section_refs.clone();
        let skill_refs = skill_refs.clone();
        let reveal_refs = reveal_refs.clone();
        use_effect_with(config.clone(), move |_| {
            // `force` publishes the view even when the reactor saw no change,
            // so a rebuilt reactor replaces the previous config's view.
            let measure = move |force: bool| {
                let Some(snapshot) = scroll_snapshot() else {
                    return;
                };
                let sections: Vec<_> = section_refs.iter().map(section_bounds).collect();
                let skill_bar_tops: Vec<_> = skill_refs
                    .iter()
                    .map(|node| element_rect(node).map(|rect| rect.top))
                    .collect();
                let reveal_rects: Vec<_> = reveal_refs.iter().map(element_rect).collect();

                let mut reactor = reactor.borrow_mut();
                let changed = reactor.react(
                    snapshot,
                    Measurements {
                        sections: &sections,
                        skill_bar_tops: &skill_bar_tops,
                        reveal_rects: &reveal_rects,
                    },
                );
                if changed || force {
                    scroll_view.set(reactor.view().clone());
                }
            };

            measure(true);

            let on_scroll = Closure::<dyn FnMut()>::new(move || measure(false));
            let win = window();
            if let Some(win) = win.as_ref() {
                let _ = win.add_event_listener_with_callback("scroll", on_scroll.as_ref().unchecked_ref());
            }

            move || {
                if let Some(win) = win {
                    let _ = win
                        .remove_event_listener_with_callback("scroll", on_scroll.as_ref().unchecked_ref());
                }
            }
        });
    }

    {
        let stat_values = stat_values.clone();
        use_effect_with(config.clone(), move |config| {
            let counters: Vec<StatCounter> = config
                .stats
                .iter()
                .map(|stat| StatCounter::new(stat.target, &config.motion))
                .collect();
            stat_values.set(vec![0; counters.len()]);

            let counters = Rc::new(RefCell::new(counters));
            let frame_counters = counters.clone();
            let token = counter::start(
                counters,
                browser_scheduler(),
                Duration::from_millis(config.motion.stats_start_delay_ms),
                move || {
                    let values = frame_counters.borrow().iter().map(StatCounter::display).collect();
                    stat_values.set(values);
                },
            );

            move || token.cancel()
        });
    }

    let on_select = {
        let board = board.clone();
        let refresh = refresh.clone();
        Callback::from(move |key: FilterKey| {
            let steps = board.borrow_mut().select(key.clone());
            log_event(
                &logger,
                LogLevel::Info,
                "filter_selected",
                json!({ "filter": key.as_str(), "visible": board.borrow().visible_count() }),
            );
            refresh.force_update();

            let scheduler = BrowserScheduler;
            for step in steps {
                let board = board.clone();
                let refresh = refresh.clone();
                scheduler.schedule(
                    step.delay,
                    Box::new(move || {
                        if board.borrow_mut().apply(step) {
                            refresh.force_update();
                        }
                    }),
                );
            }
        })
    };

    let on_back_to_top = Callback::from(|_: MouseEvent| smooth_scroll_to(0.0));

    let on_toggle_menu = {
        let menu_open = menu_open.clone();
        Callback::from(move |_: MouseEvent| menu_open.set(!*menu_open))
    };
    let close_menu = {
        let menu_open = menu_open.clone();
        Callback::from(move |()| menu_open.set(false))
    };

    let view = &*scroll_view;
    let menu_active = *menu_open;

    let nav_links = config.nav.iter().enumerate().map(|(index, entry)| {
        html! {
            <li>
                <AnchorLink
                    class={classes!("nav-link", view.link_is_active(index).then_some("active"))}
                    section={entry.section.clone()}
                    label={entry.label.clone()}
                    header_offset={header_offset}
                    onnavigate={close_menu.clone()}
                />
            </li>
        }
    });

    let sections = config.sections.iter().enumerate().map(|(index, section)| {
        let content = match section.kind {
            SectionKind::Hero => render_hero(&config, &typed_ref, header_offset),
            SectionKind::About => render_about(&config, section, view, &reveal_refs, &stat_values),
            SectionKind::Skills => render_skills(&config, section, view, &skill_refs, &reveal_refs),
            SectionKind::Projects => {
                render_projects(&config, section, view, &reveal_refs, &board.borrow(), &on_select)
            }
            SectionKind::Contact => render_contact(&config, section, logger),
            SectionKind::Text => render_text(section),
        };

        html! {
            <section id={section.id.clone()} class={classes!("section", format!("section-{}", section.id))} ref={section_refs[index].clone()}>
                {content}
            </section>
        }
    });

    html! {
        <>
            <a class="skip-link" href="#content">{"Skip to main content"}</a>
            <nav id="navbar" class={classes!("navbar", view.navbar_scrolled.then_some("scrolled"))}>
                <div class="nav-container">
                    <span class="nav-logo">{config.profile.name.clone()}</span>
                    <button
                        id="nav-toggle"
                        class={classes!("nav-toggle", menu_active.then_some("active"))}
                        type="button"
                        aria-label="Toggle navigation"
                        aria-controls="nav-menu"
                        aria-expanded={menu_active.to_string()}
                        onclick={on_toggle_menu}
                    >
                        <span class="bar"></span>
                        <span class="bar"></span>
                        <span class="bar"></span>
                    </button>
                    <ul id="nav-menu" class={classes!("nav-menu", menu_active.then_some("active"))}>
                        { for nav_links }
                    </ul>
                </div>
            </nav>

            <main id="content">
                { for sections }
            </main>

            <footer class="footer">
                <p class="muted">{format!("© {}", config.profile.name)}</p>
            </footer>

            <button
                id="backToTop"
                class={classes!("back-to-top", view.back_to_top_visible.then_some("visible"))}
                type="button"
                aria-label="Back to top"
                onclick={on_back_to_top}
            >
                <span aria-hidden="true">{"↑"}</span>
            </button>
        </>
    }
}

fn render_hero(config: &SiteConfig, typed_ref: &NodeRef, header_offset: f64) -> Html {
    html! {
        <div class="hero-content">
            <p class="hero-greeting">{"Hi, I'm"}</p>
            <h1 class="hero-name">{config.profile.name.clone()}</h1>
            <p class="hero-role">
                <span id="typed-text" class="typed-text" ref={typed_ref.clone()}></span>
                <span class="cursor" aria-hidden="true">{"|"}</span>
            </p>
            <p class="hero-tagline">{config.profile.tagline.clone()}</p>
            <div class="hero-actions">
                <AnchorLink class={classes!("button", "primary")} section="projects" label="View work" header_offset={header_offset} />
                <AnchorLink class={classes!("button")} section="contact" label="Get in touch" header_offset={header_offset} />
            </div>
        </div>
    }
}

fn render_about(
    config: &SiteConfig,
    section: &SectionEntry,
    view: &ScrollView,
    reveal_refs: &[NodeRef],
    stat_values: &[u32],
) -> Html {
    let stats = config.stats.iter().enumerate().map(|(index, stat)| {
        let block = config.stat_block(index);
        html! {
            <div
                class={classes!("info-card", view.block_is_revealed(block).then_some("animate-in"))}
                ref={reveal_refs.get(block).cloned().unwrap_or_default()}
            >
                <span class="stat-number">{stat_values.get(index).copied().unwrap_or(0).to_string()}</span>
                <span class="stat-label">{stat.label.clone()}</span>
            </div>
        }
    });

    html! {
        <>
            <h2>{section.title.clone()}</h2>
            { for section.body.iter().map(|paragraph| html! { <p>{paragraph.clone()}</p> }) }
            <div class="stats">
                { for stats }
            </div>
        </>
    }
}

fn render_skills(
    config: &SiteConfig,
    section: &SectionEntry,
    view: &ScrollView,
    skill_refs: &[NodeRef],
    reveal_refs: &[NodeRef],
) -> Html {
    let block = config.skill_list_block();
    let skills = config.skills.iter().enumerate().map(|(index, skill)| {
        let fill = view.skill_fill(index);
        html! {
            <li class="skill">
                <div class="skill-header">
                    <span>{skill.name.clone()}</span>
                    <span class="muted">{format!("{}%", skill.level)}</span>
                </div>
                <div class="skill-bar">
                    <div
                        class={classes!("skill-level", fill.is_some().then_some("animated"))}
                        style={fill.map(|percent| format!("--level: {percent}%"))}
                        ref={skill_refs.get(index).cloned().unwrap_or_default()}
                    />
                </div>
            </li>
        }
    });

    html! {
        <>
            <h2>{section.title.clone()}</h2>
            <ul
                class={classes!("skill-category", view.block_is_revealed(block).then_some("animate-in"))}
                ref={reveal_refs.get(block).cloned().unwrap_or_default()}
            >
                { for skills }
            </ul>
        </>
    }
}

fn render_projects(
    config: &SiteConfig,
    section: &SectionEntry,
    view: &ScrollView,
    reveal_refs: &[NodeRef],
    board: &ProjectBoard,
    on_select: &Callback<FilterKey>,
) -> Html {
    let keys = std::iter::once(FilterKey::All).chain(
        config
            .project_categories()
            .into_iter()
            .map(|category| FilterKey::parse(&category))
            .filter(|key| *key != FilterKey::All),
    );

    let tabs = keys.map(|key| {
        let active = board.active() == &key;
        let label = key.as_str().to_string();
        let onclick = {
            let on_select = on_select.clone();
            Callback::from(move |_: MouseEvent| on_select.emit(key.clone()))
        };
        html! {
            <button
                class={classes!("filter-btn", active.then_some("active"))}
                type="button"
                aria-pressed={active.to_string()}
                onclick={onclick}
            >
                {label}
            </button>
        }
    });

    let cards = config.projects.iter().enumerate().map(|(index, project)| {
        let state = board.card(index);
        let displayed = state.map_or(true, |card| card.displayed);
        let revealed = view.block_is_revealed(index);
        let settled = revealed && state.map_or(true, |card| card.settled);
        let style = format!(
            "display: {}; opacity: {}; transform: translateY({});",
            if displayed { "block" } else { "none" },
            if settled { "1" } else { "0" },
            if settled { "0" } else { "20px" },
        );

        html! {
            <article
                key={index}
                class={classes!("project-card", revealed.then_some("animate-in"))}
                data-category={project.category.clone()}
                style={style}
                ref={reveal_refs.get(index).cloned().unwrap_or_default()}
            >
                <h3>{project.title.clone()}</h3>
                <p class="muted">{project.description.clone()}</p>
                {
                    match project.url.as_deref() {
                        Some(url) => html! { <ExternalLink href={url.to_string()} label="Source" /> },
                        None => html! {},
                    }
                }
            </article>
        }
    });

    html! {
        <>
            <h2>{section.title.clone()}</h2>
            <div class="filter-tabs" role="group" aria-label="Filter projects">
                { for tabs }
            </div>
            <div class="project-grid">
                { for cards }
            </div>
        </>
    }
}

fn render_contact(config: &SiteConfig, section: &SectionEntry, logger: Logger) -> Html {
    html! {
        <>
            <h2>{section.title.clone()}</h2>
            { for section.body.iter().map(|paragraph| html! { <p>{paragraph.clone()}</p> }) }
            <ContactForm recipient={config.contact.email.clone()} logger={logger} />
        </>
    }
}

fn render_text(section: &SectionEntry) -> Html {
    html! {
        <>
            <h2>{section.title.clone()}</h2>
            { for section.body.iter().map(|paragraph| html! { <p>{paragraph.clone()}</p> }) }
        </>
    }
}

#[function_component(App)]
fn app() -> Html {
    let config = use_state(|| {
        SiteConfig::embedded()
            .map(Rc::new)
            .map_err(|error| error.to_string())
    });

    {
        let config = config.clone();
        use_effect_with((), move |_| {
            spawn_local(async move {
                let current = (*config).clone();
                let logger = current
                    .as_ref()
                    .map(|config| Logger::new(config.log_level))
                    .unwrap_or_default();

                match fetch_site_config().await {
                    Ok(remote) => {
                        log_event(
                            &Logger::new(remote.log_level),
                            LogLevel::Info,
                            "config_loaded",
                            json!({ "source": SITE_CONFIG_URL, "sections": remote.sections.len() }),
                        );
                        let unchanged = current.as_ref().is_ok_and(|config| **config == remote);
                        if !unchanged {
                            config.set(Ok(Rc::new(remote)));
                        }
                    }
                    Err(reason) => log_event(
                        &logger,
                        LogLevel::Info,
                        "config_fallback",
                        json!({ "source": "embedded", "reason": reason }),
                    ),
                }
            });
            || ()
        });
    }

    match &*config {
        Ok(config) => html! { <Page config={config.clone()} /> },
        Err(reason) => html! {
            <p class="config-error">{format!("Site configuration is invalid: {reason}")}</p>
        },
    }
}

pub fn run() {
    yew::Renderer::<App>::with_root(
        window()
            .and_then(|w| w.document())
            .and_then(|d| d.get_element_by_id("app"))
            .expect("missing #app mount point"),
    )
    .render();
}
