use std::fmt;
use std::rc::Rc;

use smallvec::SmallVec;
use web_time::Duration;

/// `transition` without an explicit `duration-*` runs for Tailwind's default.
const DEFAULT_TRANSITION_DURATION: Duration = Duration::from_millis(150);

/// Whitespace-separated class names, deduplicated in insertion order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ClassList(SmallVec<[String; 4]>);

impl ClassList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn parse(s: &str) -> Self {
        let mut list = Self::new();
        for class in s.split_whitespace() {
            list.add(class);
        }
        list
    }

    pub fn add(&mut self, class: &str) {
        if !self.contains(class) {
            self.0.push(class.to_string());
        }
    }

    pub fn add_all(&mut self, other: &ClassList) {
        for class in other.iter() {
            self.add(class);
        }
    }

    pub fn remove_all(&mut self, other: &ClassList) {
        self.0.retain(|c| !other.contains(c));
    }

    pub fn clear(&mut self) {
        self.0.clear();
    }

    pub fn contains(&self, class: &str) -> bool {
        self.0.iter().any(|c| c == class)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }
}

impl fmt::Display for ClassList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, class) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            f.write_str(class)?;
        }
        Ok(())
    }
}

impl From<&str> for ClassList {
    fn from(s: &str) -> Self {
        Self::parse(s)
    }
}

#[cfg(feature = "serde")]
impl serde::Serialize for ClassList {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

#[cfg(feature = "serde")]
impl<'de> serde::Deserialize<'de> for ClassList {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = <std::borrow::Cow<'de, str> as serde::Deserialize<'de>>::deserialize(deserializer)?;
        Ok(Self::parse(&s))
    }
}

/// Class lists applied over the course of an enter and a leave.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct TransitionClasses {
    /// Present for the whole enter.
    pub enter: ClassList,
    /// Present on the first frame of an enter.
    pub enter_from: ClassList,
    /// Replaces `enter_from` from the second frame until the enter ends.
    pub enter_to: ClassList,
    /// Kept once the enter has finished.
    pub entered: ClassList,
    pub leave: ClassList,
    pub leave_from: ClassList,
    pub leave_to: ClassList,
}

impl TransitionClasses {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn enter(mut self, classes: &str) -> Self {
        self.enter = ClassList::parse(classes);
        self
    }

    pub fn enter_from(mut self, classes: &str) -> Self {
        self.enter_from = ClassList::parse(classes);
        self
    }

    pub fn enter_to(mut self, classes: &str) -> Self {
        self.enter_to = ClassList::parse(classes);
        self
    }

    pub fn entered(mut self, classes: &str) -> Self {
        self.entered = ClassList::parse(classes);
        self
    }

    pub fn leave(mut self, classes: &str) -> Self {
        self.leave = ClassList::parse(classes);
        self
    }

    pub fn leave_from(mut self, classes: &str) -> Self {
        self.leave_from = ClassList::parse(classes);
        self
    }

    pub fn leave_to(mut self, classes: &str) -> Self {
        self.leave_to = ClassList::parse(classes);
        self
    }
}

/// How long one direction of a transition runs.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct Timing {
    #[cfg_attr(feature = "serde", serde(with = "crate::millis", rename = "duration_ms"))]
    pub duration: Duration,
    #[cfg_attr(feature = "serde", serde(with = "crate::millis", rename = "delay_ms"))]
    pub delay: Duration,
}

impl Timing {
    pub const ZERO: Timing = Timing {
        duration: Duration::ZERO,
        delay: Duration::ZERO,
    };

    pub fn new(duration: Duration, delay: Duration) -> Self {
        Self { duration, delay }
    }

    pub fn total(&self) -> Duration {
        self.duration + self.delay
    }

    /// Read Tailwind utilities (`duration-300`, `delay-75`,
    /// `duration-[250ms]`). Variant prefixes such as `md:` are ignored and
    /// later classes win.
    pub fn from_classes<'a>(classes: impl IntoIterator<Item = &'a str>) -> Self {
        let mut duration = None;
        let mut delay = None;
        let mut transitions = false;

        for class in classes {
            let utility = class.rsplit(':').next().unwrap_or(class);
            if let Some(v) = utility.strip_prefix("duration-") {
                duration = parse_time(v).or(duration);
            } else if let Some(v) = utility.strip_prefix("delay-") {
                delay = parse_time(v).or(delay);
            } else if utility == "transition" || utility.starts_with("transition-") {
                transitions = true;
            }
        }

        let duration = match duration {
            Some(d) => d,
            None if transitions => DEFAULT_TRANSITION_DURATION,
            None => Duration::ZERO,
        };
        Self {
            duration,
            delay: delay.unwrap_or_default(),
        }
    }
}

fn parse_time(v: &str) -> Option<Duration> {
    if let Some(arbitrary) = v.strip_prefix('[').and_then(|v| v.strip_suffix(']')) {
        if let Some(ms) = arbitrary.strip_suffix("ms") {
            return ms
                .parse::<f64>()
                .ok()
                .and_then(|ms| Duration::try_from_secs_f64(ms / 1000.0).ok());
        }
        if let Some(s) = arbitrary.strip_suffix('s') {
            return s
                .parse::<f64>()
                .ok()
                .and_then(|s| Duration::try_from_secs_f64(s).ok());
        }
        return None;
    }
    v.parse::<u64>().ok().map(Duration::from_millis)
}

/// Lifecycle callbacks of one node. They run after the engine has settled,
/// so they may toggle the transition again.
#[derive(Clone, Default)]
pub struct TransitionHooks {
    pub before_enter: Option<Rc<dyn Fn()>>,
    pub after_enter: Option<Rc<dyn Fn()>>,
    pub before_leave: Option<Rc<dyn Fn()>>,
    pub after_leave: Option<Rc<dyn Fn()>>,
}

impl TransitionHooks {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn before_enter(mut self, f: impl Fn() + 'static) -> Self {
        self.before_enter = Some(Rc::new(f));
        self
    }

    pub fn after_enter(mut self, f: impl Fn() + 'static) -> Self {
        self.after_enter = Some(Rc::new(f));
        self
    }

    pub fn before_leave(mut self, f: impl Fn() + 'static) -> Self {
        self.before_leave = Some(Rc::new(f));
        self
    }

    pub fn after_leave(mut self, f: impl Fn() + 'static) -> Self {
        self.after_leave = Some(Rc::new(f));
        self
    }
}

impl fmt::Debug for TransitionHooks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TransitionHooks")
            .field("before_enter", &self.before_enter.is_some())
            .field("after_enter", &self.after_enter.is_some())
            .field("before_leave", &self.before_leave.is_some())
            .field("after_leave", &self.after_leave.is_some())
            .finish()
    }
}

/// Per-node configuration.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ChildOptions {
    #[cfg_attr(feature = "serde", serde(flatten))]
    pub classes: TransitionClasses,
    /// Overrides the timing read from the class lists.
    pub timing: Option<Timing>,
    /// Remove the element once hidden, instead of hiding it.
    pub unmount: bool,
    /// Animate the initial mount. Only read on the root.
    pub appear: bool,
    #[cfg_attr(feature = "serde", serde(skip))]
    pub hooks: TransitionHooks,
}

impl Default for ChildOptions {
    fn default() -> Self {
        Self {
            classes: TransitionClasses::default(),
            timing: None,
            unmount: true,
            appear: false,
            hooks: TransitionHooks::default(),
        }
    }
}

impl ChildOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn classes(mut self, classes: TransitionClasses) -> Self {
        self.classes = classes;
        self
    }

    pub fn timing(mut self, timing: Timing) -> Self {
        self.timing = Some(timing);
        self
    }

    pub fn unmount(mut self, unmount: bool) -> Self {
        self.unmount = unmount;
        self
    }

    pub fn appear(mut self, appear: bool) -> Self {
        self.appear = appear;
        self
    }

    pub fn hooks(mut self, hooks: TransitionHooks) -> Self {
        self.hooks = hooks;
        self
    }

    pub(crate) fn enter_timing(&self) -> Timing {
        self.timing.unwrap_or_else(|| {
            Timing::from_classes(self.classes.enter.iter().chain(self.classes.enter_to.iter()))
        })
    }

    pub(crate) fn leave_timing(&self) -> Timing {
        self.timing.unwrap_or_else(|| {
            Timing::from_classes(self.classes.leave.iter().chain(self.classes.leave_to.iter()))
        })
    }
}
