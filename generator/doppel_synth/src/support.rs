//! Embedded delegation support-library sources.
//!
//! Generated artifacts reference a small runtime library of delegation
//! helpers. The generator can write these sources next to its artifacts so
//! generated code is self-contained: a value cell with replaceable get/set
//! behavior, a handler registration list with replaceable add/remove
//! behavior, the element-wise comparer backing generic-operation slot
//! dictionaries, and the disposable guard used for deferred construction.

/// One support-library source file.
#[derive(Clone, Copy, Eq, PartialEq, Debug)]
pub struct SupportSource {
    pub file_name: &'static str,
    pub text: &'static str,
}

/// Every support source, in a fixed order.
pub fn support_sources() -> &'static [SupportSource] {
    SOURCES
}

static SOURCES: &[SupportSource] = &[
    SupportSource {
        file_name: "PropertyImplementation.cs",
        text: PROPERTY_IMPLEMENTATION,
    },
    SupportSource {
        file_name: "EventImplementation.cs",
        text: EVENT_IMPLEMENTATION,
    },
    SupportSource {
        file_name: "EnumerableEqualityComparer.cs",
        text: ENUMERABLE_EQUALITY_COMPARER,
    },
    SupportSource {
        file_name: "DelayedConstruction.cs",
        text: DELAYED_CONSTRUCTION,
    },
];

/// A value cell whose get/set behavior can be replaced independently of its
/// stored value. Assigning a plain value through the implicit conversion
/// resets the behaviors to ordinary storage.
static PROPERTY_IMPLEMENTATION: &str = r#"// this file was created by doppel
using System;

namespace System.Delegation
{
    public class PropertyImplementation<T>
    {
        public Func<T> get;

        public Action<T> set;

        public T value;

        public PropertyImplementation(T initialValue = default(T))
        {
            value = initialValue;
            set = input => value = input;
            get = () => value;
        }

        public static implicit operator T(PropertyImplementation<T> cast) => cast.get();

        public static implicit operator PropertyImplementation<T>(T cast) => new PropertyImplementation<T>(cast);
    }
}
"#;

/// A handler registration list with replaceable add/remove behavior and an
/// invoke helper that calls every registered handler in registration order.
static EVENT_IMPLEMENTATION: &str = r#"// this file was created by doppel
using System.Collections.Generic;

namespace System.Delegation
{
    public class EventImplementation<TEventArgs>
    {
        public readonly List<EventHandler<TEventArgs>> handlers = new List<EventHandler<TEventArgs>>();

        public Action<EventHandler<TEventArgs>> add;

        public Action<EventHandler<TEventArgs>> remove;

        public EventImplementation()
        {
            add = handlers.Add;
            remove = value => handlers.Remove(value);
        }

        public static EventImplementation<TEventArgs> operator +(EventImplementation<TEventArgs> ev, EventHandler<TEventArgs> toAdd)
        {
            ev.add(toAdd);
            return ev;
        }

        public static EventImplementation<TEventArgs> operator -(EventImplementation<TEventArgs> ev, EventHandler<TEventArgs> toRemove)
        {
            ev.remove(toRemove);
            return ev;
        }

        public void Invoke(object sender, TEventArgs args)
        {
            foreach (var handler in handlers)
            {
                handler(sender, args);
            }
        }
    }
}
"#;

/// Element-wise equality over sequences. Contravariance makes this usable as
/// a comparer for type-argument arrays keying slot dictionaries.
static ENUMERABLE_EQUALITY_COMPARER: &str = r#"// this file was created by doppel
using System.Collections.Generic;
using System.Linq;

namespace System.Delegation
{
    public class EnumerableEqualityComparer<T> : IEqualityComparer<IEnumerable<T>>
    {
        public bool Equals(IEnumerable<T> a, IEnumerable<T> b)
        {
            if (a == null || b == null)
            {
                return a == null && b == null;
            }
            return a.SequenceEqual(b);
        }

        public int GetHashCode(IEnumerable<T> sequence)
        {
            unchecked
            {
                int hash = 17;
                foreach (var item in sequence)
                {
                    hash = hash * 31 + (item == null ? 0 : item.GetHashCode());
                }
                return hash;
            }
        }
    }
}
"#;

/// Disposable guard that runs a deferred construction action exactly once on
/// disposal, so a `using` scope guarantees construction on every exit path.
static DELAYED_CONSTRUCTION: &str = r#"// this file was created by doppel
using System;

namespace System.Delegation
{
    public class DelayedConstruction : IDisposable
    {
        private Action construct;

        public DelayedConstruction(Action construct) => this.construct = construct;

        public void Dispose()
        {
            if (construct != null)
            {
                construct();
                construct = null;
            }
        }
    }
}
"#;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sources_are_complete_and_namespaced() {
        let sources = support_sources();
        assert_eq!(sources.len(), 4);
        for source in sources {
            assert!(source.file_name.ends_with(".cs"));
            assert!(source.text.contains("namespace System.Delegation"));
            assert!(source.text.ends_with('\n'));
        }
    }

    #[test]
    fn file_names_are_unique() {
        let sources = support_sources();
        for (i, a) in sources.iter().enumerate() {
            for b in &sources[i + 1..] {
                assert_ne!(a.file_name, b.file_name);
            }
        }
    }
}
